//! Session controller
//!
//! Owns the single `Session` of one visitor and sequences everything that mutates it:
//! video ingestion, quota checks, question submission, answer replay and the limit notice.
//!
//! The session lives inside a `watch` channel. Every mutation is one synchronous
//! closure run through `send_if_modified`, so renderers subscribed to the channel
//! always see a consistent state, and a mutation that changes nothing wakes nobody.
//!
//! Exclusivity is explicit: `Session::in_flight` is taken before the first awaited
//! gateway call and released by the terminal write of the same operation. While it
//! is held, new submissions are turned away as `Busy`.
//!
//! `reupload` replaces the session wholesale and bumps its generation. Anything still
//! running for an older generation (gateway calls, stream steps, the limit timer) checks
//! the generation before writing and drops its result on mismatch.

use std::pin::pin;
use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use uuid::Uuid;

use crate::config::SessionSettings;
use crate::domain::models::{
    DeliveryState, IngestReport, IngestionState, Message, Session, SessionView, VideoId,
};
use crate::domain::services::quota_gate;
use crate::domain::services::{AnsweringGateway, TranscriptGateway};
use crate::shared::constants::{ANSWER_FAILED_NOTICE, INGESTION_FAILED_NOTICE, ingestion_greeting};
use crate::shared::errors::GatewayError;
use crate::shared::logging::{self, LogOperation};
use crate::shared::utils::StreamRenderer;

/// What `submit_video` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoOutcome {
    Ready { video_id: VideoId, chunk_count: usize },
    Failed(GatewayError),
    /// Blank reference, nothing changed
    EmptyReference,
    /// Another operation holds the in-flight flag, nothing changed
    Busy,
    /// A video is already loaded; reupload first
    AlreadyLoaded,
    /// The session was reset while ingesting; the result was dropped
    Discarded,
}

/// What `submit_question` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionOutcome {
    Answered,
    /// The placeholder now holds the fixed error notice; the quota slot stays consumed
    AnswerFailed(GatewayError),
    /// Quota exhausted: the limit notice is visible and the question was dropped
    LimitReached,
    EmptyQuestion,
    /// No video is ready
    NotReady,
    Busy,
    Discarded,
}

/// Drives one session. Cheap to clone; clones share the same session.
#[derive(Clone)]
pub struct SessionController {
    state: Arc<watch::Sender<Session>>,
    transcripts: Arc<dyn TranscriptGateway>,
    answers: Arc<dyn AnsweringGateway>,
    renderer: StreamRenderer,
    settings: SessionSettings,
}

impl SessionController {
    pub fn new(
        transcripts: Arc<dyn TranscriptGateway>,
        answers: Arc<dyn AnsweringGateway>,
        settings: SessionSettings,
    ) -> Self {
        let (state, _) = watch::channel(Session::new(settings.quota_limit));
        Self {
            state: Arc::new(state),
            transcripts,
            answers,
            renderer: StreamRenderer::new(settings.chunk_size, settings.step_delay),
            settings,
        }
    }

    /// Controller backed by one object implementing both gateways
    pub fn with_backend<G>(backend: Arc<G>, settings: SessionSettings) -> Self
    where
        G: TranscriptGateway + AnsweringGateway + 'static,
    {
        Self::new(backend.clone(), backend, settings)
    }

    /// Receiver notified after every state change
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Current read-only projection
    pub fn view(&self) -> SessionView {
        self.state.borrow().view()
    }

    /// Resolve `reference`, ingest its transcript and seed the log.
    ///
    /// Allowed from the empty and failed states. Either failure leaves the session
    /// `Failed` with a single fixed notice.
    pub async fn submit_video(&self, reference: &str) -> VideoOutcome {
        let reference = reference.trim();
        if reference.is_empty() {
            logging::log_submission_rejected("empty_reference");
            return VideoOutcome::EmptyReference;
        }

        let mut rejected = None;
        let mut generation = 0;
        self.state.send_if_modified(|s| {
            if s.in_flight {
                rejected = Some(VideoOutcome::Busy);
                return false;
            }
            if s.ingestion_state == IngestionState::Ready {
                rejected = Some(VideoOutcome::AlreadyLoaded);
                return false;
            }
            s.ingestion_state = IngestionState::Ingesting;
            s.in_flight = true;
            generation = s.generation;
            true
        });
        if let Some(outcome) = rejected {
            logging::log_submission_rejected(if outcome == VideoOutcome::Busy {
                "busy"
            } else {
                "already_loaded"
            });
            return outcome;
        }

        logging::log_ingestion_start(reference);
        let result = self.ingest(reference).await;

        let applied = self.apply_current(generation, |s| {
            s.in_flight = false;
            match &result {
                Ok((video_id, report)) => {
                    s.ingestion_state = IngestionState::Ready;
                    s.video_ref = Some(video_id.clone());
                    s.messages = vec![Message::assistant(ingestion_greeting(
                        report.chunk_count,
                        s.quota_limit,
                    ))];
                }
                Err(_) => {
                    s.ingestion_state = IngestionState::Failed;
                    s.video_ref = None;
                    s.messages = vec![Message::assistant(INGESTION_FAILED_NOTICE)];
                }
            }
            true
        });
        if !applied {
            logging::log_stale_result(LogOperation::VideoIngestion, generation);
            return VideoOutcome::Discarded;
        }

        match result {
            Ok((video_id, report)) => {
                logging::log_ingestion_success(video_id.as_str(), report.chunk_count);
                VideoOutcome::Ready {
                    video_id,
                    chunk_count: report.chunk_count,
                }
            }
            Err(error) => {
                logging::log_ingestion_error(reference, &error.to_string());
                VideoOutcome::Failed(error)
            }
        }
    }

    async fn ingest(&self, reference: &str) -> Result<(VideoId, IngestReport), GatewayError> {
        let video_id = self.transcripts.resolve_video_id(reference).await?;
        let report = self.transcripts.ingest_transcript(&video_id).await?;
        Ok((video_id, report))
    }

    /// Ask one question about the loaded video.
    ///
    /// The quota slot is consumed here, before the gateway is called, and is not
    /// refunded if the answer fails.
    pub async fn submit_question(&self, text: &str) -> QuestionOutcome {
        let question = text.trim();
        if question.is_empty() {
            logging::log_submission_rejected("empty_question");
            return QuestionOutcome::EmptyQuestion;
        }

        let mut rejected = None;
        let mut ticket = (0, 0, 0);
        self.state.send_if_modified(|s| {
            if s.ingestion_state != IngestionState::Ready {
                rejected = Some(QuestionOutcome::NotReady);
                return false;
            }
            // Checked before the quota: a busy session never raises the limit notice
            if s.in_flight {
                rejected = Some(QuestionOutcome::Busy);
                return false;
            }
            if !quota_gate::can_ask(s.question_count, s.quota_limit) {
                rejected = Some(QuestionOutcome::LimitReached);
                ticket = (s.generation, s.question_count, s.quota_limit);
                let changed = !s.limit_modal_visible;
                s.limit_modal_visible = true;
                return changed;
            }
            s.messages.push(Message::user(question));
            s.question_count += 1;
            s.messages.push(Message::placeholder());
            s.in_flight = true;
            ticket = (s.generation, s.question_count, s.quota_limit);
            true
        });

        let (generation, question_count, quota_limit) = ticket;
        match rejected {
            Some(QuestionOutcome::LimitReached) => {
                logging::log_quota_exhausted(question_count, quota_limit);
                return QuestionOutcome::LimitReached;
            }
            Some(outcome) => {
                logging::log_submission_rejected(match outcome {
                    QuestionOutcome::Busy => "busy",
                    _ => "not_ready",
                });
                return outcome;
            }
            None => {}
        }

        let request_id = Uuid::new_v4().to_string();
        logging::log_question_accepted(&request_id, question_count, quota_limit);

        match self.answers.ask(question).await {
            Ok(answer) => {
                let outcome = self.deliver(generation, &request_id, answer.text).await;
                if outcome == QuestionOutcome::Answered
                    && quota_gate::is_exhausted(question_count, quota_limit)
                {
                    self.schedule_limit_notice(generation);
                }
                outcome
            }
            Err(error) => {
                let applied = self.apply_current(generation, |s| {
                    s.replace_last(ANSWER_FAILED_NOTICE, DeliveryState::Complete);
                    s.in_flight = false;
                    true
                });
                if !applied {
                    logging::log_stale_result(LogOperation::AnswerDelivery, generation);
                    return QuestionOutcome::Discarded;
                }
                logging::log_answer_error(&request_id, &error.to_string());
                QuestionOutcome::AnswerFailed(error)
            }
        }
    }

    /// Replay `answer` into the placeholder, then release the in-flight flag
    async fn deliver(&self, generation: u64, request_id: &str, answer: String) -> QuestionOutcome {
        let mut steps = pin!(self.renderer.paced(answer.clone()));
        let mut step_count = 0;
        while let Some(step) = steps.next().await {
            step_count += 1;
            if !self.apply_current(generation, |s| s.replace_last(&step.text, step.delivery)) {
                logging::log_stale_result(LogOperation::AnswerDelivery, generation);
                return QuestionOutcome::Discarded;
            }
        }

        // Terminal write: the last message must equal the full answer whatever the steps did
        let applied = self.apply_current(generation, |s| {
            s.replace_last(&answer, DeliveryState::Complete);
            s.in_flight = false;
            true
        });
        if !applied {
            logging::log_stale_result(LogOperation::AnswerDelivery, generation);
            return QuestionOutcome::Discarded;
        }

        logging::log_answer_delivered(request_id, answer.chars().count(), step_count);
        QuestionOutcome::Answered
    }

    /// Show the limit notice after the grace delay, unless the session was reset meanwhile
    fn schedule_limit_notice(&self, generation: u64) {
        let state = Arc::clone(&self.state);
        let delay = self.settings.limit_grace_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_if_modified(|s| {
                if s.generation != generation
                    || s.limit_modal_visible
                    || !quota_gate::is_exhausted(s.question_count, s.quota_limit)
                {
                    return false;
                }
                s.limit_modal_visible = true;
                true
            });
        });
    }

    pub fn dismiss_limit_modal(&self) {
        self.state.send_if_modified(|s| {
            let changed = s.limit_modal_visible;
            s.limit_modal_visible = false;
            changed
        });
    }

    /// Discard the whole session and start over empty
    pub fn reupload(&self) {
        let quota_limit = self.settings.quota_limit;
        let mut generation = 0;
        self.state.send_modify(|s| {
            generation = s.generation + 1;
            *s = Session::with_generation(quota_limit, generation);
        });
        logging::log_session_reset(generation);
    }

    /// Run `mutate` only if the session is still at `generation`.
    ///
    /// Returns whether the generation matched; subscribers are notified only when
    /// `mutate` reports a change.
    fn apply_current(&self, generation: u64, mutate: impl FnOnce(&mut Session) -> bool) -> bool {
        let mut current = false;
        self.state.send_if_modified(|s| {
            if s.generation != generation {
                return false;
            }
            current = true;
            mutate(s)
        });
        current
    }
}
