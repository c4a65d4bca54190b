use serde::{Deserialize, Serialize};

/// One perception-source reading, produced once per sampling tick.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PerceptionSample {
    pub face_detected: bool,
    pub is_blinking: bool,
    pub eye_openness: f64,
}

impl PerceptionSample {
    pub fn no_face() -> Self {
        Self {
            face_detected: false,
            is_blinking: false,
            eye_openness: 0.0,
        }
    }

    pub fn face(is_blinking: bool, eye_openness: f64) -> Self {
        Self {
            face_detected: true,
            is_blinking,
            eye_openness,
        }
    }
}

/// Opaque reference to the video element or capture device a session reads from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoHandle {
    pub device: String,
}

impl VideoHandle {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
        }
    }
}
