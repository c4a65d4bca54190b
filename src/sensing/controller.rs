use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::{sync::Mutex, task::JoinHandle, time::Duration};
use tokio_util::sync::CancellationToken;

use crate::{
    focus::FocusState, models::VideoHandle, perception::PerceptionSource,
    presentation::StatsSink,
};

use super::loop_worker::{display_loop, sampling_loop};

#[derive(Debug, Clone, Copy)]
pub struct SensingIntervals {
    pub sample: Duration,
    pub display: Duration,
    pub detection_timeout: Duration,
}

/// Owns the two periodic tasks of one session and the token that stops them.
pub struct SensingController {
    sampler: Option<JoinHandle<()>>,
    clock: Option<JoinHandle<()>>,
    cancel_token: CancellationToken,
}

impl SensingController {
    pub fn start<P: PerceptionSource>(
        session_id: String,
        perception: Arc<P>,
        video: VideoHandle,
        state: Arc<Mutex<FocusState>>,
        sink: Arc<dyn StatsSink>,
        intervals: SensingIntervals,
    ) -> Self {
        let cancel_token = CancellationToken::new();

        info!(
            "starting sensing for session {} (sample every {:?}, clock every {:?})",
            session_id, intervals.sample, intervals.display
        );

        let clock = tokio::spawn(display_loop(
            state.clone(),
            sink.clone(),
            intervals.display,
            cancel_token.clone(),
        ));
        let sampler = tokio::spawn(sampling_loop(
            session_id,
            perception,
            video,
            state,
            sink,
            intervals,
            cancel_token.clone(),
        ));

        Self {
            sampler: Some(sampler),
            clock: Some(clock),
            cancel_token,
        }
    }

    /// Stops both tasks from scheduling further work. Does not wait for them.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Waits for both tasks to exit. Call after `cancel`.
    pub async fn join(&mut self) -> Result<()> {
        if let Some(handle) = self.clock.take() {
            handle.await.context("display task failed to join")?;
        }
        if let Some(handle) = self.sampler.take() {
            handle.await.context("sampling task failed to join")?;
        }
        Ok(())
    }
}

impl Drop for SensingController {
    fn drop(&mut self) {
        self.cancel_token.cancel();
    }
}
