use std::sync::Arc;

use chrono::Utc;
use tokio::{
    sync::Mutex,
    time::{Duration, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    error::DetectionError,
    focus::FocusState,
    models::{PerceptionSample, VideoHandle},
    perception::PerceptionSource,
    presentation::{SessionClock, StatsSink},
};

use super::controller::SensingIntervals;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Polls the perception source once per interval and feeds the session state.
///
/// Each tick's detection is awaited (bounded by `detection_timeout`) before the
/// next tick is scheduled, so ticks never overlap.
pub async fn sampling_loop<P: PerceptionSource>(
    session_id: String,
    perception: Arc<P>,
    video: VideoHandle,
    state: Arc<Mutex<FocusState>>,
    sink: Arc<dyn StatsSink>,
    intervals: SensingIntervals,
    cancel_token: CancellationToken,
) {
    let detection_timeout = intervals.detection_timeout;
    let mut ticker = tokio::time::interval(intervals.sample);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => {
                log_info!("sampling loop shutting down for session {}", session_id);
                break;
            }
            _ = ticker.tick() => {
                let detection = tokio::time::timeout(detection_timeout, perception.detect_sample(&video));
                let outcome = tokio::select! {
                    biased;
                    _ = cancel_token.cancelled() => {
                        log_info!("sampling loop shutting down for session {}", session_id);
                        break;
                    }
                    outcome = detection => outcome,
                };

                match outcome {
                    Ok(Ok(sample)) => apply_sample(&state, sink.as_ref(), &cancel_token, &sample).await,
                    Ok(Err(err)) => log_warn!("skipping tick for session {}: {err}", session_id),
                    Err(_) => log_warn!(
                        "skipping tick for session {}: {}",
                        session_id,
                        DetectionError::Timeout(detection_timeout)
                    ),
                }
            }
        }
    }
}

async fn apply_sample(
    state: &Mutex<FocusState>,
    sink: &dyn StatsSink,
    cancel_token: &CancellationToken,
    sample: &PerceptionSample,
) {
    let mut guard = state.lock().await;
    // stop() cancels under this lock; anything that resolved after that is stale
    if cancel_token.is_cancelled() {
        return;
    }
    if let Some(stats) = guard.ingest_sample(sample, Utc::now()) {
        sink.publish_stats(stats);
    }
}

/// Publishes the `MM:SS` session clock once per interval.
pub async fn display_loop(
    state: Arc<Mutex<FocusState>>,
    sink: Arc<dyn StatsSink>,
    interval: Duration,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel_token.cancelled() => break,
            _ = ticker.tick() => {
                let guard = state.lock().await;
                if cancel_token.is_cancelled() || !guard.is_active() {
                    break;
                }
                sink.publish_clock(SessionClock::from_elapsed(guard.elapsed_secs(Utc::now())));
            }
        }
    }
}
