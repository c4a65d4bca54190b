pub mod controller;
pub mod scoring;
pub mod state;

pub use controller::{FocusController, SessionResources};
pub use state::FocusState;
