use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who authored a turn in the log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// Whether a message has reached its final text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    #[default]
    Complete,
    /// Only valid for assistant messages; the text is a strict prefix of the final answer.
    Streaming,
}

/// One turn in the session log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
    pub delivery: DeliveryState,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            delivery: DeliveryState::Complete,
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
            delivery: DeliveryState::Complete,
            timestamp: Utc::now(),
        }
    }

    /// Empty assistant turn waiting for its answer
    pub fn placeholder() -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: String::new(),
            delivery: DeliveryState::Streaming,
            timestamp: Utc::now(),
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.delivery == DeliveryState::Streaming
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_is_streaming_assistant() {
        let msg = Message::placeholder();
        assert_eq!(msg.speaker, Speaker::Assistant);
        assert!(msg.text.is_empty());
        assert!(msg.is_streaming());
    }

    #[test]
    fn test_message_serializes_lowercase_tags() {
        let json = serde_json::to_value(Message::user("hi")).unwrap();
        assert_eq!(json["speaker"], "user");
        assert_eq!(json["delivery"], "complete");
        assert_eq!(json["text"], "hi");
    }
}
