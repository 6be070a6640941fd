//! Contracts of the external collaborators consumed by the session controller
//!
//! Both gateways are implemented over HTTP by `infrastructure::api::BackendClient`;
//! tests swap in scripted doubles.

use async_trait::async_trait;

use crate::domain::models::{Answer, IngestReport, VideoId};
use crate::shared::errors::GatewayError;

/// Resolves video references and triggers transcript extraction
#[async_trait]
pub trait TranscriptGateway: Send + Sync {
    /// Turn a raw reference (URL or id) into a canonical video id.
    /// Fails with `GatewayError::InvalidReference`.
    async fn resolve_video_id(&self, reference: &str) -> Result<VideoId, GatewayError>;

    /// Extract and index the transcript of `video_id`.
    /// Fails with `GatewayError::IngestionFailed`.
    async fn ingest_transcript(&self, video_id: &VideoId) -> Result<IngestReport, GatewayError>;
}

/// Answers questions against the most recently ingested video.
///
/// The video binding is ambient (held by the backend), the question is the only input.
#[async_trait]
pub trait AnsweringGateway: Send + Sync {
    /// Fails with `GatewayError::AnswerFailed`.
    async fn ask(&self, question: &str) -> Result<Answer, GatewayError>;
}
