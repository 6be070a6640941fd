//! Free-tier question quota
//!
//! Pure counter/threshold rule consulted by the session controller before it
//! accepts a question. Nothing here touches session state.

/// Whether one more question may be accepted
pub fn can_ask(question_count: u32, quota_limit: u32) -> bool {
    question_count < quota_limit
}

/// Whether the counter has reached the limit (the limit notice is due)
pub fn is_exhausted(question_count: u32, quota_limit: u32) -> bool {
    !can_ask(question_count, quota_limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_ask_below_limit() {
        for count in 0..5 {
            assert!(can_ask(count, 5), "count {count} should be allowed");
        }
    }

    #[test]
    fn test_cannot_ask_at_or_above_limit() {
        assert!(!can_ask(5, 5));
        assert!(!can_ask(6, 5));
        assert!(is_exhausted(5, 5));
    }

    #[test]
    fn test_zero_limit_never_allows() {
        assert!(!can_ask(0, 0));
    }
}
