//! Scripted gateway doubles for controller tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use super::gateways::{AnsweringGateway, TranscriptGateway};
use crate::domain::models::{Answer, IngestReport, VideoId};
use crate::shared::errors::GatewayError;

pub const TEST_VIDEO_ID: &str = "dQw4w9WgXcQ";

/// Gateway returning queued results in order.
///
/// Empty queues fall back to a successful default. Calls can be held open
/// with `hold_answers` / `hold_ingestion` until the test releases them.
#[derive(Default)]
pub struct ScriptedGateway {
    resolutions: Mutex<VecDeque<Result<VideoId, GatewayError>>>,
    ingestions: Mutex<VecDeque<Result<IngestReport, GatewayError>>>,
    answers: Mutex<VecDeque<Result<Answer, GatewayError>>>,
    questions: Mutex<Vec<String>>,
    references: Mutex<Vec<String>>,
    answer_gate: Option<Arc<Semaphore>>,
    ingest_gate: Option<Arc<Semaphore>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chunks(self, chunk_count: usize) -> Self {
        self.push_ingestion(Ok(IngestReport::with_chunks(chunk_count)));
        self
    }

    pub fn with_answer(self, answer: &str) -> Self {
        self.push_answer(Ok(Answer::new(answer)));
        self
    }

    pub fn with_answer_error(self, detail: &str) -> Self {
        self.push_answer(Err(GatewayError::AnswerFailed(detail.to_string())));
        self
    }

    pub fn with_resolution_error(self, detail: &str) -> Self {
        self.resolutions
            .lock()
            .unwrap()
            .push_back(Err(GatewayError::InvalidReference(detail.to_string())));
        self
    }

    pub fn with_ingestion_error(self, detail: &str) -> Self {
        self.push_ingestion(Err(GatewayError::IngestionFailed(detail.to_string())));
        self
    }

    /// Block every `ask` until `release_answers` hands out a permit
    pub fn hold_answers(mut self) -> Self {
        self.answer_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Block every `ingest_transcript` until `release_ingestion` hands out a permit
    pub fn hold_ingestion(mut self) -> Self {
        self.ingest_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn push_answer(&self, result: Result<Answer, GatewayError>) {
        self.answers.lock().unwrap().push_back(result);
    }

    pub fn push_ingestion(&self, result: Result<IngestReport, GatewayError>) {
        self.ingestions.lock().unwrap().push_back(result);
    }

    pub fn release_answers(&self, count: usize) {
        if let Some(gate) = &self.answer_gate {
            gate.add_permits(count);
        }
    }

    pub fn release_ingestion(&self, count: usize) {
        if let Some(gate) = &self.ingest_gate {
            gate.add_permits(count);
        }
    }

    /// Questions received so far, in call order
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    pub fn references(&self) -> Vec<String> {
        self.references.lock().unwrap().clone()
    }
}

async fn pass(gate: &Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        gate.acquire().await.unwrap().forget();
    }
}

#[async_trait]
impl TranscriptGateway for ScriptedGateway {
    async fn resolve_video_id(&self, reference: &str) -> Result<VideoId, GatewayError> {
        self.references.lock().unwrap().push(reference.to_string());
        let scripted = self.resolutions.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(VideoId::parse(TEST_VIDEO_ID).unwrap()))
    }

    async fn ingest_transcript(&self, _video_id: &VideoId) -> Result<IngestReport, GatewayError> {
        pass(&self.ingest_gate).await;
        let scripted = self.ingestions.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(IngestReport::with_chunks(1)))
    }
}

#[async_trait]
impl AnsweringGateway for ScriptedGateway {
    async fn ask(&self, question: &str) -> Result<Answer, GatewayError> {
        self.questions.lock().unwrap().push(question.to_string());
        pass(&self.answer_gate).await;
        let scripted = self.answers.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(Answer::new(format!("answer to {question}"))))
    }
}
