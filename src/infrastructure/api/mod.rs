// HTTP client for the transcript backend
pub mod backend_client;

pub use backend_client::{BackendClient, HealthStatus, TranscriptStatus};
