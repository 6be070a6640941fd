use serde::{Deserialize, Serialize};

use super::message::{DeliveryState, Message};
use super::video::VideoId;
use crate::shared::constants::{PLACEHOLDER_ASK, PLACEHOLDER_LIMIT_REACHED};

/// Lifecycle of the currently targeted video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestionState {
    #[default]
    Idle,
    Ingesting,
    Ready,
    Failed,
}

/// Composite controller state: ingestion state crossed with "question in flight"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Empty,
    Ingesting,
    ReadyIdle,
    ReadyAnswering,
    Failed,
}

/// State of one visitor's video conversation.
///
/// Owned by the session controller; everything outside the crate only reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub(crate) video_ref: Option<VideoId>,
    pub(crate) ingestion_state: IngestionState,
    pub(crate) messages: Vec<Message>,
    pub(crate) question_count: u32,
    pub(crate) quota_limit: u32,
    pub(crate) limit_modal_visible: bool,
    /// Held while a gateway call or a stream replay is outstanding
    pub(crate) in_flight: bool,
    /// Bumped on every reupload; work started under an older generation is discarded
    pub(crate) generation: u64,
}

impl Session {
    pub fn new(quota_limit: u32) -> Self {
        Self::with_generation(quota_limit, 0)
    }

    pub(crate) fn with_generation(quota_limit: u32, generation: u64) -> Self {
        Self {
            video_ref: None,
            ingestion_state: IngestionState::Idle,
            messages: Vec::new(),
            question_count: 0,
            quota_limit,
            limit_modal_visible: false,
            in_flight: false,
            generation,
        }
    }

    pub fn video_ref(&self) -> Option<&VideoId> {
        self.video_ref.as_ref()
    }

    pub fn ingestion_state(&self) -> IngestionState {
        self.ingestion_state
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn quota_limit(&self) -> u32 {
        self.quota_limit
    }

    pub fn limit_modal_visible(&self) -> bool {
        self.limit_modal_visible
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight
    }

    pub fn remaining_questions(&self) -> u32 {
        self.quota_limit.saturating_sub(self.question_count)
    }

    pub fn phase(&self) -> SessionPhase {
        match self.ingestion_state {
            IngestionState::Idle => SessionPhase::Empty,
            IngestionState::Ingesting => SessionPhase::Ingesting,
            IngestionState::Failed => SessionPhase::Failed,
            IngestionState::Ready if self.in_flight => SessionPhase::ReadyAnswering,
            IngestionState::Ready => SessionPhase::ReadyIdle,
        }
    }

    /// Replace the most recent message in place.
    ///
    /// Returns false when the log is empty or the message is already identical,
    /// so callers can skip notifying subscribers.
    pub(crate) fn replace_last(&mut self, text: &str, delivery: DeliveryState) -> bool {
        let Some(last) = self.messages.last_mut() else {
            return false;
        };
        if last.text == text && last.delivery == delivery {
            return false;
        }
        last.text.clear();
        last.text.push_str(text);
        last.delivery = delivery;
        true
    }

    /// Read-only projection handed to renderers
    pub fn view(&self) -> SessionView {
        let input_disabled = self.in_flight || self.question_count >= self.quota_limit;
        SessionView {
            video_id: self.video_ref.as_ref().map(|id| id.as_str().to_string()),
            thumbnail_url: self.video_ref.as_ref().map(VideoId::thumbnail_url),
            ingestion_state: self.ingestion_state,
            phase: self.phase(),
            messages: self.messages.clone(),
            question_count: self.question_count,
            quota_limit: self.quota_limit,
            remaining_questions: self.remaining_questions(),
            limit_modal_visible: self.limit_modal_visible,
            is_loading: self.in_flight,
            input_disabled,
            input_placeholder: if self.question_count >= self.quota_limit {
                PLACEHOLDER_LIMIT_REACHED
            } else {
                PLACEHOLDER_ASK
            }
            .to_string(),
        }
    }
}

/// Snapshot of the session as a renderer sees it on one re-render cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub video_id: Option<String>,
    pub thumbnail_url: Option<String>,
    pub ingestion_state: IngestionState,
    pub phase: SessionPhase,
    pub messages: Vec<Message>,
    pub question_count: u32,
    pub quota_limit: u32,
    pub remaining_questions: u32,
    pub limit_modal_visible: bool,
    pub is_loading: bool,
    pub input_disabled: bool,
    pub input_placeholder: String,
}
