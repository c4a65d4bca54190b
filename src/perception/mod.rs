//! Inbound side of the engine: camera and per-frame perception.
//!
//! Both collaborators are owned by the session that starts them and are
//! released when it stops.

mod landmarks;
mod simulated;

pub use landmarks::{
    eye_aspect_ratio, EyeLandmarks, FaceLandmarks, LandmarkDetector, LandmarkPerception, Point,
    DEFAULT_BLINK_THRESHOLD,
};
pub use simulated::{SimulatedCamera, SimulatedPerception};

use std::future::Future;

use crate::error::{DetectionError, InitError};
use crate::models::{PerceptionSample, VideoHandle};

pub trait PerceptionSource: Send + Sync + 'static {
    /// Prepares the model for `video`. Called once per session start.
    fn initialize(&self, video: &VideoHandle) -> impl Future<Output = Result<(), InitError>> + Send;

    /// Produces the sample for the current frame.
    fn detect_sample(
        &self,
        video: &VideoHandle,
    ) -> impl Future<Output = Result<PerceptionSample, DetectionError>> + Send;
}

pub trait CameraSource: Send + Sync + 'static {
    fn initialize(&self, video: &VideoHandle) -> impl Future<Output = Result<(), InitError>> + Send;

    /// Stops capture. Safe to call on a camera that never started.
    fn stop(&self) -> impl Future<Output = ()> + Send;
}
