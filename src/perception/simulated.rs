use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::{DetectionError, InitError};
use crate::models::{PerceptionSample, VideoHandle};

use super::{CameraSource, PerceptionSource};

/// Random perception stream for running the engine without a webcam.
pub struct SimulatedPerception {
    rng: Mutex<StdRng>,
    face_presence: f64,
    blink_probability: f64,
    failure_rate: f64,
}

impl SimulatedPerception {
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
            // ~24 blinks/min at a 100 ms tick
            face_presence: 0.95,
            blink_probability: 0.04,
            failure_rate: 0.01,
        }
    }

    pub fn with_rates(mut self, face_presence: f64, blink_probability: f64, failure_rate: f64) -> Self {
        self.face_presence = face_presence.clamp(0.0, 1.0);
        self.blink_probability = blink_probability.clamp(0.0, 1.0);
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    fn next_sample(&self) -> Result<PerceptionSample, DetectionError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| DetectionError::Failed("simulated rng poisoned".into()))?;

        if rng.gen_bool(self.failure_rate) {
            return Err(DetectionError::Failed("simulated frame drop".into()));
        }
        if !rng.gen_bool(self.face_presence) {
            return Ok(PerceptionSample::no_face());
        }

        let blinking = rng.gen_bool(self.blink_probability);
        let openness = if blinking {
            rng.gen_range(0.05..0.18)
        } else {
            rng.gen_range(0.24..0.36)
        };
        Ok(PerceptionSample::face(blinking, openness))
    }
}

impl Default for SimulatedPerception {
    fn default() -> Self {
        Self::new()
    }
}

impl PerceptionSource for SimulatedPerception {
    async fn initialize(&self, video: &VideoHandle) -> Result<(), InitError> {
        info!("simulated perception ready on {}", video.device);
        Ok(())
    }

    async fn detect_sample(&self, _video: &VideoHandle) -> Result<PerceptionSample, DetectionError> {
        self.next_sample()
    }
}

#[derive(Debug, Default)]
pub struct SimulatedCamera {
    running: AtomicBool,
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl CameraSource for SimulatedCamera {
    async fn initialize(&self, video: &VideoHandle) -> Result<(), InitError> {
        if video.device.is_empty() {
            return Err(InitError::new("camera", "no capture device configured"));
        }
        self.running.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_stream_is_reproducible() {
        let a = SimulatedPerception::seeded(7);
        let b = SimulatedPerception::seeded(7);
        for _ in 0..100 {
            let left = a.next_sample().ok();
            let right = b.next_sample().ok();
            assert_eq!(left, right);
        }
    }

    #[test]
    fn blinking_samples_have_low_openness() {
        let perception = SimulatedPerception::seeded(11).with_rates(1.0, 0.5, 0.0);
        for _ in 0..200 {
            let sample = perception.next_sample().unwrap();
            assert!(sample.face_detected);
            if sample.is_blinking {
                assert!(sample.eye_openness < 0.18);
            } else {
                assert!(sample.eye_openness >= 0.24);
            }
        }
    }

    #[test]
    fn absent_user_never_shows_a_face() {
        let perception = SimulatedPerception::seeded(3).with_rates(0.0, 0.5, 0.0);
        for _ in 0..50 {
            assert!(!perception.next_sample().unwrap().face_detected);
        }
    }

    #[tokio::test]
    async fn camera_tracks_running_state() {
        let camera = SimulatedCamera::new();
        assert!(camera.initialize(&VideoHandle::new("")).await.is_err());
        assert!(!camera.is_running());

        camera.initialize(&VideoHandle::new("default")).await.unwrap();
        assert!(camera.is_running());
        camera.stop().await;
        assert!(!camera.is_running());
    }
}
