use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Canonical identifier of an ingested video (11 URL-safe characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

fn canonical_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("static regex"))
}

impl VideoId {
    /// Accept an id only if it has the canonical shape
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        canonical_pattern()
            .is_match(raw)
            .then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Watch URL the transcript backend expects for extraction
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    pub fn thumbnail_url(&self) -> String {
        format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a successful transcript ingestion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    pub chunk_count: usize,
    #[serde(default)]
    pub transcript_length: Option<usize>,
    #[serde(default)]
    pub preview: Option<String>,
}

impl IngestReport {
    pub fn with_chunks(chunk_count: usize) -> Self {
        Self {
            chunk_count,
            transcript_length: None,
            preview: None,
        }
    }
}

/// Fully resolved answer returned by the answering gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
}

impl Answer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}
