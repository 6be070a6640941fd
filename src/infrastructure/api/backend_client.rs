use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;
use crate::domain::models::{Answer, IngestReport, VideoId};
use crate::domain::services::{AnsweringGateway, TranscriptGateway};
use crate::shared::errors::{AppError, GatewayError, Result};
use crate::shared::logging;

#[derive(Debug, Serialize)]
struct VideoRequest<'a> {
    video_url: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Deserialize)]
struct VideoIdResponse {
    video_id: String,
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    chunks_count: usize,
    #[serde(default)]
    transcript_length: Option<usize>,
    #[serde(default)]
    preview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    answer: AnswerBody,
}

/// The answer is either plain text or a QA-chain result object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AnswerBody {
    Text(String),
    Chain { result: String },
}

impl AnswerBody {
    fn into_text(self) -> String {
        match self {
            AnswerBody::Text(text) | AnswerBody::Chain { result: text } => text,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

/// `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// `GET /api/transcript/current`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptStatus {
    pub loaded: bool,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub vectorstore_available: Option<bool>,
}

/// HTTP client for the transcript backend.
///
/// Implements both gateways. Transport and backend failures are `AppError`s here and
/// are folded into the matching `GatewayError` at the trait boundary.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    // Generic GET request
    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.url(endpoint);
        logging::log_backend_request("GET", &url);
        let response = self.client.get(&url).send().await?;
        Self::read_json(&url, response).await
    }

    // Generic POST request
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(endpoint);
        logging::log_backend_request("POST", &url);
        let response = self.client.post(&url).json(body).send().await?;
        Self::read_json(&url, response).await
    }

    async fn read_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.error)
                .unwrap_or_else(|_| status.canonical_reason().unwrap_or("Request failed").to_string());
            logging::log_backend_error(url, status.as_u16(), &message);
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| AppError::InvalidResponse(e.to_string()))
    }

    // Specific API methods
    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/api/health").await
    }

    pub async fn current_transcript(&self) -> Result<TranscriptStatus> {
        self.get("/api/transcript/current").await
    }

    /// Drop the transcript loaded on the backend; returns its confirmation message
    pub async fn clear_transcript(&self) -> Result<String> {
        let body: MessageBody = self.post("/api/transcript/clear", &serde_json::json!({})).await?;
        Ok(body.message)
    }

    pub async fn extract_video_id(&self, reference: &str) -> Result<VideoId> {
        let body: VideoIdResponse = self
            .post("/api/video/id", &VideoRequest { video_url: reference })
            .await?;
        VideoId::parse(&body.video_id)
            .ok_or_else(|| AppError::InvalidResponse(format!("not a video id: {}", body.video_id)))
    }

    pub async fn extract_transcript(&self, video_id: &VideoId) -> Result<IngestReport> {
        let watch_url = video_id.watch_url();
        let body: ExtractResponse = self
            .post("/api/transcript/extract", &VideoRequest { video_url: &watch_url })
            .await?;
        Ok(IngestReport {
            chunk_count: body.chunks_count,
            transcript_length: body.transcript_length,
            preview: body.preview,
        })
    }

    pub async fn chat(&self, question: &str) -> Result<Answer> {
        let body: ChatResponse = self.post("/api/chat", &ChatRequest { question }).await?;
        Ok(Answer::new(body.answer.into_text()))
    }
}

#[async_trait]
impl TranscriptGateway for BackendClient {
    async fn resolve_video_id(&self, reference: &str) -> std::result::Result<VideoId, GatewayError> {
        self.extract_video_id(reference)
            .await
            .map_err(|e| GatewayError::InvalidReference(e.detail()))
    }

    async fn ingest_transcript(
        &self,
        video_id: &VideoId,
    ) -> std::result::Result<IngestReport, GatewayError> {
        self.extract_transcript(video_id)
            .await
            .map_err(|e| GatewayError::IngestionFailed(e.detail()))
    }
}

#[async_trait]
impl AnsweringGateway for BackendClient {
    async fn ask(&self, question: &str) -> std::result::Result<Answer, GatewayError> {
        self.chat(question)
            .await
            .map_err(|e| GatewayError::AnswerFailed(e.detail()))
    }
}
