use thiserror::Error;

/// Failures reported by the transcript and answering gateways.
///
/// The session controller catches every variant and turns it into a fixed notice
/// in the message log; none of them reach the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Invalid video reference: {0}")]
    InvalidReference(String),

    #[error("Transcript ingestion failed: {0}")]
    IngestionFailed(String),

    #[error("Answer failed: {0}")]
    AnswerFailed(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Human-readable detail carried into a gateway error
    pub fn detail(&self) -> String {
        match self {
            AppError::Api { message, .. } => message.clone(),
            AppError::Http(e) if e.is_timeout() => "Request timed out".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_detail_is_backend_message() {
        let err = AppError::Api {
            status: 400,
            message: "Invalid YouTube URL or could not extract video ID".to_string(),
        };
        assert_eq!(err.detail(), "Invalid YouTube URL or could not extract video ID");
        assert_eq!(
            err.to_string(),
            "Backend returned 400: Invalid YouTube URL or could not extract video ID"
        );
    }

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::AnswerFailed("boom".to_string());
        assert_eq!(err.to_string(), "Answer failed: boom");
    }

    #[test]
    fn test_io_error_converts() {
        let err: AppError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed").into();
        assert!(matches!(err, AppError::Io(_)));
        assert_eq!(err.detail(), "IO error: closed");
    }
}
