use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::{DetectionError, InitError};
use crate::models::{PerceptionSample, VideoHandle};

use super::PerceptionSource;

pub const DEFAULT_BLINK_THRESHOLD: f64 = 0.21;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Six contour points of one eye: outer corner, two upper lid points,
/// inner corner, two lower lid points (p1..p6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EyeLandmarks(pub [Point; 6]);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FaceLandmarks {
    pub left_eye: EyeLandmarks,
    pub right_eye: EyeLandmarks,
}

/// EAR = (|p2-p6| + |p3-p5|) / (2 * |p1-p4|)
pub fn eye_aspect_ratio(eye: &EyeLandmarks) -> f64 {
    let [p1, p2, p3, p4, p5, p6] = &eye.0;
    let vertical = p2.distance(p6) + p3.distance(p5);
    let horizontal = p1.distance(p4).max(1e-6);
    vertical / (2.0 * horizontal)
}

/// The face-mesh model. Returns `None` when no face is in frame.
pub trait LandmarkDetector: Send + Sync + 'static {
    fn load(&self, video: &VideoHandle) -> impl Future<Output = Result<(), InitError>> + Send;

    fn estimate(
        &self,
        video: &VideoHandle,
    ) -> impl Future<Output = Result<Option<FaceLandmarks>, DetectionError>> + Send;
}

/// Turns raw eye landmarks into engine samples.
pub struct LandmarkPerception<D> {
    detector: D,
    blink_threshold: f64,
}

impl<D: LandmarkDetector> LandmarkPerception<D> {
    pub fn new(detector: D) -> Self {
        Self::with_threshold(detector, DEFAULT_BLINK_THRESHOLD)
    }

    pub fn with_threshold(detector: D, blink_threshold: f64) -> Self {
        Self {
            detector,
            blink_threshold,
        }
    }

    pub fn sample_from(&self, landmarks: Option<&FaceLandmarks>) -> PerceptionSample {
        match landmarks {
            None => PerceptionSample::no_face(),
            Some(face) => {
                let openness =
                    (eye_aspect_ratio(&face.left_eye) + eye_aspect_ratio(&face.right_eye)) / 2.0;
                PerceptionSample::face(openness < self.blink_threshold, openness)
            }
        }
    }
}

impl<D: LandmarkDetector> PerceptionSource for LandmarkPerception<D> {
    async fn initialize(&self, video: &VideoHandle) -> Result<(), InitError> {
        self.detector.load(video).await
    }

    async fn detect_sample(&self, video: &VideoHandle) -> Result<PerceptionSample, DetectionError> {
        let landmarks = self.detector.estimate(video).await?;
        Ok(self.sample_from(landmarks.as_ref()))
    }
}
