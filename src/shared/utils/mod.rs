// Utility functions
// Answer replay helpers

pub mod stream_renderer;

pub use stream_renderer::{PrefixSteps, StreamRenderer, StreamStep};
