// Business logic services
// Framework-agnostic, 100% testable

pub mod gateways;
pub mod quota_gate;

#[cfg(test)]
pub mod test_support;

pub use gateways::{AnsweringGateway, TranscriptGateway};
