//! Terminal renderer for the session projection
//!
//! Turns successive `SessionView` snapshots into append-only terminal output: each
//! completed message is printed once, a streaming message is printed as it grows
//! (only the newly revealed suffix), and the limit notice is printed once per
//! appearance.

use std::io::{self, Write};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::domain::models::{DeliveryState, Message, Session, SessionView, Speaker};
use crate::shared::state::{QuestionOutcome, VideoOutcome};

pub struct TerminalRenderer<W: Write> {
    out: W,
    /// Messages printed in full
    printed: usize,
    last_printed: Option<Message>,
    /// Bytes already printed of the streaming message at index `printed`
    streamed: usize,
    video_shown: Option<String>,
    modal_shown: bool,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            last_printed: None,
            streamed: 0,
            video_shown: None,
            modal_shown: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn render(&mut self, view: &SessionView) -> io::Result<()> {
        if self.log_was_replaced(view) {
            self.finish_partial_line()?;
            self.printed = 0;
            self.last_printed = None;
            if view.messages.is_empty() {
                self.video_shown = None;
                writeln!(self.out, "--- new session ---")?;
            }
        }

        if view.video_id != self.video_shown {
            if let (Some(id), Some(thumbnail)) = (&view.video_id, &view.thumbnail_url) {
                writeln!(self.out, "Video {id} (thumbnail: {thumbnail})")?;
            }
            self.video_shown = view.video_id.clone();
        }

        while let Some(message) = view.messages.get(self.printed) {
            if message.delivery == DeliveryState::Streaming {
                self.render_streaming(message)?;
                break;
            }
            self.render_complete(message)?;
            self.printed += 1;
            self.last_printed = Some(message.clone());
        }

        if view.limit_modal_visible && !self.modal_shown {
            writeln!(
                self.out,
                "*** You've used all {} free questions for this video. Type /new to start over with another video, or /dismiss to close this notice.",
                view.quota_limit
            )?;
        }
        self.modal_shown = view.limit_modal_visible;

        self.out.flush()
    }

    /// The log no longer extends what was printed: reupload or a re-seeded log
    fn log_was_replaced(&self, view: &SessionView) -> bool {
        if self.printed == 0 {
            return false;
        }
        view.messages.get(self.printed - 1) != self.last_printed.as_ref()
    }

    fn render_streaming(&mut self, message: &Message) -> io::Result<()> {
        if message.text.is_empty() {
            return Ok(());
        }
        match message.text.get(self.streamed..) {
            Some(suffix) if self.streamed > 0 => write!(self.out, "{suffix}")?,
            _ => {
                self.finish_partial_line()?;
                write!(self.out, "{}{}", prefix(message.speaker), message.text)?;
            }
        }
        self.streamed = message.text.len();
        Ok(())
    }

    fn render_complete(&mut self, message: &Message) -> io::Result<()> {
        match message.text.get(self.streamed..) {
            Some(suffix) if self.streamed > 0 => writeln!(self.out, "{suffix}")?,
            _ => {
                self.finish_partial_line()?;
                writeln!(self.out, "{}{}", prefix(message.speaker), message.text)?;
            }
        }
        self.streamed = 0;
        Ok(())
    }

    fn finish_partial_line(&mut self) -> io::Result<()> {
        if self.streamed > 0 {
            writeln!(self.out)?;
            self.streamed = 0;
        }
        Ok(())
    }
}

fn prefix(speaker: Speaker) -> &'static str {
    match speaker {
        Speaker::User => "You: ",
        Speaker::Assistant => "Assistant: ",
    }
}

/// Render every published session until the channel closes
pub fn spawn_renderer<W>(mut rx: watch::Receiver<Session>, out: W) -> JoinHandle<io::Result<()>>
where
    W: Write + Send + 'static,
{
    tokio::spawn(async move {
        let mut renderer = TerminalRenderer::new(out);
        loop {
            let view = rx.borrow_and_update().view();
            renderer.render(&view)?;
            if rx.changed().await.is_err() {
                let view = rx.borrow().view();
                return renderer.render(&view);
            }
        }
    })
}

/// Feedback for outcomes that leave no trace in the log
pub fn question_notice(outcome: &QuestionOutcome) -> Option<&'static str> {
    match outcome {
        QuestionOutcome::Busy => Some("Still answering the previous question, please wait."),
        QuestionOutcome::NotReady => Some("Load a video first."),
        _ => None,
    }
}

pub fn video_notice(outcome: &VideoOutcome) -> Option<&'static str> {
    match outcome {
        VideoOutcome::EmptyReference => Some("Please enter a YouTube URL."),
        VideoOutcome::Busy => Some("Still loading the previous video, please wait."),
        VideoOutcome::AlreadyLoaded => Some("A video is already loaded. Type /new to switch videos."),
        _ => None,
    }
}
