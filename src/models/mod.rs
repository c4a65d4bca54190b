pub mod sample;
pub mod session;

pub use sample::{PerceptionSample, VideoHandle};
pub use session::{BlinkEvent, SessionRecord, SessionStatus, SessionSummary};
