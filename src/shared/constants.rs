//! Fixed values shared by the controller and the renderers

use std::time::Duration;

/// Free-tier questions per session
pub const QUOTA_LIMIT: u32 = 5;

/// Characters revealed per stream step
pub const STREAM_CHUNK_SIZE: usize = 8;

/// Pause between two stream steps
pub const STREAM_STEP_DELAY: Duration = Duration::from_millis(15);

/// Delay before the limit notice appears after the last free answer
pub const LIMIT_GRACE_DELAY: Duration = Duration::from_millis(500);

pub const INGESTION_FAILED_NOTICE: &str = "Sorry, I couldn't extract the transcript from this video. Please make sure the URL is valid and the video has captions available.";

pub const ANSWER_FAILED_NOTICE: &str = "Sorry, I encountered an error. Please try again.";

pub const PLACEHOLDER_ASK: &str = "Ask a question about this video...";

pub const PLACEHOLDER_LIMIT_REACHED: &str = "Question limit reached";

/// Greeting seeded into the log after a successful ingestion
pub fn ingestion_greeting(chunk_count: usize, quota_limit: u32) -> String {
    format!(
        "Great! I've loaded the video and extracted the transcript. The video has {chunk_count} text chunks. \
         Feel free to ask me any questions about its content. You have {quota_limit} free questions to get started."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_mentions_chunks_and_quota() {
        let greeting = ingestion_greeting(42, 5);
        assert!(greeting.contains("42 text chunks"));
        assert!(greeting.contains("5 free questions"));
    }
}
