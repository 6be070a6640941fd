//! Simulated streaming of an already-resolved answer
//!
//! The answering backend returns the whole answer at once. To give the log the
//! feel of token-by-token arrival, the answer is replayed as a finite sequence
//! of growing prefixes: `chunk_size` characters more per step, with a fixed
//! pause between steps. Every step except the last is `Streaming`; the last one
//! is the full answer, `Complete`.

use std::time::Duration;

use futures::stream::{self, Stream};

use crate::domain::models::DeliveryState;

/// One write into the in-flight assistant message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamStep {
    pub text: String,
    pub delivery: DeliveryState,
}

/// Lazy, finite, non-restartable sequence of answer prefixes.
///
/// Chunks are counted in characters, so multi-byte text is never split inside
/// a code point. An empty answer yields no steps at all.
#[derive(Debug)]
pub struct PrefixSteps {
    answer: String,
    chunk_size: usize,
    /// Byte offset of the end of the last emitted prefix
    end: usize,
    remaining: usize,
}

impl PrefixSteps {
    pub fn new(answer: impl Into<String>, chunk_size: usize) -> Self {
        let answer = answer.into();
        let chunk_size = chunk_size.max(1);
        let remaining = answer.chars().count().div_ceil(chunk_size);
        Self {
            answer,
            chunk_size,
            end: 0,
            remaining,
        }
    }
}

impl Iterator for PrefixSteps {
    type Item = StreamStep;

    fn next(&mut self) -> Option<StreamStep> {
        if self.end >= self.answer.len() {
            return None;
        }
        let rest = &self.answer[self.end..];
        let advance = rest
            .char_indices()
            .nth(self.chunk_size)
            .map(|(offset, _)| offset)
            .unwrap_or(rest.len());
        self.end += advance;
        self.remaining = self.remaining.saturating_sub(1);

        let delivery = if self.end < self.answer.len() {
            DeliveryState::Streaming
        } else {
            DeliveryState::Complete
        };
        Some(StreamStep {
            text: self.answer[..self.end].to_string(),
            delivery,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for PrefixSteps {}

/// Paces `PrefixSteps` in time
#[derive(Debug, Clone, Copy)]
pub struct StreamRenderer {
    chunk_size: usize,
    step_delay: Duration,
}

impl StreamRenderer {
    pub fn new(chunk_size: usize, step_delay: Duration) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            step_delay,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Unpaced steps, for callers that drive their own clock
    pub fn steps(&self, answer: impl Into<String>) -> PrefixSteps {
        PrefixSteps::new(answer, self.chunk_size)
    }

    /// Steps as an async stream, sleeping `step_delay` after every `Streaming` step.
    ///
    /// No delay follows the final `Complete` step.
    pub fn paced(self, answer: String) -> impl Stream<Item = StreamStep> + Send + 'static {
        let delay = self.step_delay;
        let steps = self.steps(answer);
        stream::unfold((steps, false), move |(mut steps, pause)| async move {
            if pause {
                tokio::time::sleep(delay).await;
            }
            let step = steps.next()?;
            let more = step.delivery == DeliveryState::Streaming;
            Some((step, (steps, more)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::time::Instant;

    fn texts(steps: impl Iterator<Item = StreamStep>) -> Vec<(String, DeliveryState)> {
        steps.map(|s| (s.text, s.delivery)).collect()
    }

    #[test]
    fn test_ten_chars_make_two_steps() {
        let steps = texts(PrefixSteps::new("abcdefghij", 8));
        assert_eq!(
            steps,
            vec![
                ("abcdefgh".to_string(), DeliveryState::Streaming),
                ("abcdefghij".to_string(), DeliveryState::Complete),
            ]
        );
    }

    #[test]
    fn test_exact_multiple_ends_complete() {
        let steps = texts(PrefixSteps::new("abcdefghijklmnop", 8));
        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].1, DeliveryState::Streaming);
        assert_eq!(steps[1], ("abcdefghijklmnop".to_string(), DeliveryState::Complete));
    }

    #[test]
    fn test_short_answer_is_single_complete_step() {
        let steps = texts(PrefixSteps::new("hi", 8));
        assert_eq!(steps, vec![("hi".to_string(), DeliveryState::Complete)]);
    }

    #[test]
    fn test_empty_answer_yields_nothing() {
        let mut steps = PrefixSteps::new("", 8);
        assert_eq!(steps.len(), 0);
        assert!(steps.next().is_none());
    }

    #[test]
    fn test_prefixes_grow_monotonically() {
        let answer = "## Summary\n- **Point one** explains the intro\n- Point two wraps up";
        let mut previous = 0;
        let steps: Vec<_> = PrefixSteps::new(answer, 8).collect();
        for (i, step) in steps.iter().enumerate() {
            assert!(answer.starts_with(&step.text));
            assert!(step.text.len() > previous);
            previous = step.text.len();
            let last = i == steps.len() - 1;
            assert_eq!(step.delivery == DeliveryState::Complete, last);
        }
        assert_eq!(steps.last().unwrap().text, answer);
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let answer = "héllo wörld ✓ done";
        let steps: Vec<_> = PrefixSteps::new(answer, 8).collect();
        assert_eq!(steps[0].text.chars().count(), 8);
        assert_eq!(steps.last().unwrap().text, answer);
    }

    #[test]
    fn test_size_hint_counts_steps() {
        let steps = PrefixSteps::new("abcdefghijklmnopq", 8);
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn test_zero_chunk_size_is_clamped() {
        let renderer = StreamRenderer::new(0, Duration::ZERO);
        assert_eq!(renderer.chunk_size(), 1);
        assert_eq!(renderer.steps("abc").count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_paced_sleeps_between_streaming_steps_only() {
        let renderer = StreamRenderer::new(8, Duration::from_millis(15));
        let start = Instant::now();
        let steps: Vec<_> = renderer.paced("abcdefghijklmnopq".to_string()).collect().await;

        assert_eq!(steps.len(), 3);
        // Two pauses: after step 1 and step 2, none after the final step
        assert_eq!(start.elapsed(), Duration::from_millis(30));
    }
}
