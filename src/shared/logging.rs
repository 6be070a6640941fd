//! Structured logging for the transcript chat session
//!
//! Provides consistent, contextual logging across the controller and the backend client.
//! Every event carries an `operation` field so a log filter can follow one concern.

use tracing_subscriber::EnvFilter;

/// Operations that emit log events
#[derive(Debug, Clone, Copy)]
pub enum LogOperation {
    VideoIngestion,
    QuestionSubmission,
    AnswerDelivery,
    QuotaGate,
    SessionReset,
    BackendRequest,
}

impl LogOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOperation::VideoIngestion => "video_ingestion",
            LogOperation::QuestionSubmission => "question_submission",
            LogOperation::AnswerDelivery => "answer_delivery",
            LogOperation::QuotaGate => "quota_gate",
            LogOperation::SessionReset => "session_reset",
            LogOperation::BackendRequest => "backend_request",
        }
    }
}

/// Install the stderr subscriber used by the binary.
///
/// `RUST_LOG` wins when set; otherwise `warn`, or `info` with `verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Log the start of an ingestion
pub fn log_ingestion_start(reference: &str) {
    tracing::info!(
        operation = LogOperation::VideoIngestion.as_str(),
        reference = reference,
        "Starting video ingestion"
    );
}

/// Log a successful ingestion
pub fn log_ingestion_success(video_id: &str, chunk_count: usize) {
    tracing::info!(
        operation = LogOperation::VideoIngestion.as_str(),
        video_id = video_id,
        chunk_count = chunk_count,
        "Transcript ingested"
    );
}

/// Log a failed ingestion
pub fn log_ingestion_error(reference: &str, error: &str) {
    tracing::error!(
        operation = LogOperation::VideoIngestion.as_str(),
        reference = reference,
        error = error,
        "Failed to ingest transcript"
    );
}

/// Log an accepted question
pub fn log_question_accepted(request_id: &str, question_count: u32, quota_limit: u32) {
    tracing::info!(
        operation = LogOperation::QuestionSubmission.as_str(),
        request_id = request_id,
        question_count = question_count,
        quota_limit = quota_limit,
        "Question accepted"
    );
}

/// Log a submission turned away without touching the session
pub fn log_submission_rejected(reason: &str) {
    tracing::debug!(
        operation = LogOperation::QuestionSubmission.as_str(),
        reason = reason,
        "Submission rejected"
    );
}

/// Log a question dropped by the quota gate
pub fn log_quota_exhausted(question_count: u32, quota_limit: u32) {
    tracing::info!(
        operation = LogOperation::QuotaGate.as_str(),
        question_count = question_count,
        quota_limit = quota_limit,
        "Question quota exhausted"
    );
}

/// Log a fully replayed answer
pub fn log_answer_delivered(request_id: &str, answer_chars: usize, steps: usize) {
    tracing::info!(
        operation = LogOperation::AnswerDelivery.as_str(),
        request_id = request_id,
        answer_chars = answer_chars,
        steps = steps,
        "Answer delivered"
    );
}

/// Log a failed answer (quota is not refunded)
pub fn log_answer_error(request_id: &str, error: &str) {
    tracing::error!(
        operation = LogOperation::AnswerDelivery.as_str(),
        request_id = request_id,
        error = error,
        "Failed to get answer"
    );
}

/// Log work that finished after a reupload and was thrown away
pub fn log_stale_result(operation: LogOperation, generation: u64) {
    tracing::debug!(
        operation = operation.as_str(),
        generation = generation,
        "Discarded result from a previous session"
    );
}

/// Log a full session reset
pub fn log_session_reset(generation: u64) {
    tracing::info!(
        operation = LogOperation::SessionReset.as_str(),
        generation = generation,
        "Session reset"
    );
}

/// Log an outgoing backend request
pub fn log_backend_request(method: &str, url: &str) {
    tracing::debug!(
        operation = LogOperation::BackendRequest.as_str(),
        method = method,
        url = url,
        "Backend request"
    );
}

/// Log a backend error response
pub fn log_backend_error(url: &str, status: u16, message: &str) {
    tracing::warn!(
        operation = LogOperation::BackendRequest.as_str(),
        url = url,
        status = status,
        error = message,
        "Backend returned an error"
    );
}
