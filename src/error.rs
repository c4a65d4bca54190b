use std::time::Duration;

use thiserror::Error;

/// Camera or perception setup failed; the session never leaves its previous state.
#[derive(Debug, Error)]
#[error("{component} failed to initialize: {reason}")]
pub struct InitError {
    pub component: &'static str,
    pub reason: String,
}

impl InitError {
    pub fn new(component: &'static str, reason: impl Into<String>) -> Self {
        Self {
            component,
            reason: reason.into(),
        }
    }
}

/// A single sampling tick could not produce a sample. Never fatal to the session.
#[derive(Debug, Error)]
pub enum DetectionError {
    #[error("detection failed: {0}")]
    Failed(String),
    #[error("detection timed out after {0:?}")]
    Timeout(Duration),
}
