use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    db::Database,
    error::InitError,
    models::{PerceptionSample, SessionSummary, VideoHandle},
    perception::{CameraSource, PerceptionSource},
    presentation::{DisplayStats, SessionClock, StatsSink},
    sensing::{SensingController, SensingIntervals},
    settings::FocusSettings,
};

use super::FocusState;

/// Camera and perception handles a session takes ownership of at start.
pub struct SessionResources<P, C> {
    pub perception: P,
    pub camera: C,
    pub video: VideoHandle,
}

struct ActiveSession<C> {
    session_id: String,
    camera: C,
    sensing: SensingController,
}

/// Drives focus sessions: lifecycle, periodic sampling and publishing.
///
/// Lifecycle calls are serialized through `active`; the sampling and display
/// tasks only ever touch `state`.
pub struct FocusController<P, C> {
    state: Arc<Mutex<FocusState>>,
    active: Arc<Mutex<Option<ActiveSession<C>>>>,
    sink: Arc<dyn StatsSink>,
    intervals: SensingIntervals,
    db: Option<Database>,
    _perception: std::marker::PhantomData<fn() -> P>,
}

impl<P, C> Clone for FocusController<P, C> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            active: Arc::clone(&self.active),
            sink: Arc::clone(&self.sink),
            intervals: self.intervals,
            db: self.db.clone(),
            _perception: std::marker::PhantomData,
        }
    }
}

impl<P: PerceptionSource, C: CameraSource> FocusController<P, C> {
    pub fn new(sink: Arc<dyn StatsSink>, settings: &FocusSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(FocusState::new())),
            active: Arc::new(Mutex::new(None)),
            sink,
            intervals: settings.intervals(),
            db: None,
            _perception: std::marker::PhantomData,
        }
    }

    /// Persist every closed session to `db`.
    pub fn with_database(mut self, db: Database) -> Self {
        self.db = Some(db);
        self
    }

    pub async fn get_state(&self) -> FocusState {
        self.state.lock().await.clone()
    }

    pub async fn display_stats(&self) -> DisplayStats {
        self.state.lock().await.display_stats()
    }

    pub async fn is_active(&self) -> bool {
        self.state.lock().await.is_active()
    }

    /// Opens a new session and starts sampling.
    ///
    /// A no-op returning the current state if a session is already active;
    /// the passed resources are dropped in that case. On `InitError` the
    /// previous state is left untouched and the camera is stopped again.
    pub async fn start(&self, resources: SessionResources<P, C>) -> Result<FocusState, InitError> {
        let mut active = self.active.lock().await;
        if let Some(session) = active.as_ref() {
            debug!("start ignored: session {} already active", session.session_id);
            return Ok(self.get_state().await);
        }

        let SessionResources {
            perception,
            camera,
            video,
        } = resources;

        camera.initialize(&video).await?;
        if let Err(err) = perception.initialize(&video).await {
            camera.stop().await;
            return Err(err);
        }

        let session_id = Uuid::new_v4().to_string();
        let snapshot = {
            let mut state = self.state.lock().await;
            let opened = state.begin_session(session_id.clone(), Utc::now());
            debug_assert!(opened, "state active without a tracked session");
            self.sink.publish_stats(state.display_stats());
            self.sink.publish_clock(SessionClock::from_elapsed(0));
            state.clone()
        };

        let sensing = SensingController::start(
            session_id.clone(),
            Arc::new(perception),
            video,
            self.state.clone(),
            self.sink.clone(),
            self.intervals,
        );

        info!("focus session {} started", session_id);
        *active = Some(ActiveSession {
            session_id,
            camera,
            sensing,
        });

        Ok(snapshot)
    }

    /// Applies a sample pushed by the host instead of the sampling task.
    pub async fn ingest_sample(&self, sample: &PerceptionSample) -> Option<DisplayStats> {
        let mut state = self.state.lock().await;
        let stats = state.ingest_sample(sample, Utc::now())?;
        self.sink.publish_stats(stats);
        Some(stats)
    }

    /// Closes the active session and returns its summary, or `None` if no
    /// session is active.
    pub async fn stop(&self) -> Option<SessionSummary> {
        let mut active = self.active.lock().await;
        let Some(mut session) = active.take() else {
            debug!("stop ignored: no active session");
            return None;
        };

        let summary = {
            let mut state = self.state.lock().await;
            session.sensing.cancel();
            let summary = state.close(Utc::now());
            self.sink.publish_stats(state.display_stats());
            summary
        };

        if let Err(err) = session.sensing.join().await {
            error!("sensing tasks for session {} did not shut down cleanly: {err:#}", session.session_id);
        }
        session.camera.stop().await;

        let summary = summary?;
        info!(
            "focus session {} closed: attention={:.1} blink_rate={:.1} distractions={}",
            summary.id, summary.attention_score, summary.blink_rate, summary.distractions
        );

        if let Some(db) = &self.db {
            if let Err(err) = db.insert_focus_session(&summary).await {
                error!("failed to persist focus session {}: {err:#}", summary.id);
            }
        }

        Some(summary)
    }
}
