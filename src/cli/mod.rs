/// Command handlers for the terminal front-end
pub mod commands;

/// Rendering of the session projection to a terminal
pub mod terminal;

use clap::{Parser, Subcommand};

use crate::config::{AppConfig, timeout_from_secs};

#[derive(Parser)]
#[command(name = "transcript-chat")]
#[command(about = "Ask questions about the transcript of a YouTube video")]
pub struct Cli {
    /// Base URL of the transcript backend
    #[arg(long, global = true)]
    pub api_url: Option<String>,
    /// Per-request timeout in seconds (0 waits forever)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
    /// Questions allowed per video
    #[arg(long, global = true)]
    pub quota: Option<u32>,
    /// Log progress to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive chat about one video at a time
    Chat {
        /// Video to load right away (URL or id)
        #[arg(long)]
        video: Option<String>,
    },
    /// Show backend health and the currently loaded transcript
    Status,
    /// Load a video and ask each question in order
    Ask {
        #[arg(long)]
        video: String,
        #[arg(required = true)]
        questions: Vec<String>,
    },
}

impl Cli {
    /// Layer command-line flags over `config`
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(url) = &self.api_url {
            config.api.base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(secs) = self.timeout_secs {
            config.api.request_timeout = timeout_from_secs(secs);
        }
        if let Some(quota) = self.quota {
            config.session.quota_limit = quota;
        }
    }
}

/// One line typed during a chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Quit,
    New,
    Dismiss,
    Status,
    Question(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/quit" | "/exit" => ChatInput::Quit,
            "/new" => ChatInput::New,
            "/dismiss" => ChatInput::Dismiss,
            "/status" => ChatInput::Status,
            other => ChatInput::Question(other.to_string()),
        }
    }
}
