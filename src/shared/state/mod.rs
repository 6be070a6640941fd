// Session state ownership
pub mod session_controller;

pub use session_controller::{QuestionOutcome, SessionController, VideoOutcome};
