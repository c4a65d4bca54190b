//! Per-tick attention rules.
//!
//! Exactly one rule fires per sample and the order below is the tie-break:
//! face absence, fatigue (fast blinking), staring (slow blinking), recovery.

pub const MAX_SCORE: f64 = 100.0;
pub const MIN_SCORE: f64 = 0.0;

/// Blink-rate denominators never drop below this many minutes.
pub const MIN_ELAPSED_MINUTES: f64 = 0.1;

pub const NO_FACE_PENALTY: f64 = 5.0;
pub const FATIGUE_BLINK_RATE: f64 = 30.0;
pub const FATIGUE_FLOOR: f64 = 20.0;
pub const STARING_BLINK_RATE: f64 = 5.0;
pub const STARING_FLOOR: f64 = 40.0;
pub const DRIFT_STEP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttentionRule {
    NoFace,
    Fatigue,
    Staring,
    Recovery,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Adjustment {
    pub rule: AttentionRule,
    pub score: f64,
}

impl Adjustment {
    pub fn is_distraction(&self) -> bool {
        self.rule == AttentionRule::NoFace
    }
}

/// Blinks per minute over the elapsed session time.
pub fn blink_rate(blink_count: usize, elapsed_minutes: f64) -> f64 {
    blink_count as f64 / elapsed_minutes.max(MIN_ELAPSED_MINUTES)
}

pub fn adjust_attention(score: f64, face_detected: bool, blink_rate: f64) -> Adjustment {
    if !face_detected {
        Adjustment {
            rule: AttentionRule::NoFace,
            score: (score - NO_FACE_PENALTY).max(MIN_SCORE),
        }
    } else if blink_rate > FATIGUE_BLINK_RATE {
        Adjustment {
            rule: AttentionRule::Fatigue,
            score: (score - DRIFT_STEP).max(FATIGUE_FLOOR),
        }
    } else if blink_rate < STARING_BLINK_RATE {
        Adjustment {
            rule: AttentionRule::Staring,
            score: (score - DRIFT_STEP).max(STARING_FLOOR),
        }
    } else {
        Adjustment {
            rule: AttentionRule::Recovery,
            score: (score + DRIFT_STEP).min(MAX_SCORE),
        }
    }
}
