//! Cooperative cancellation, checked at tick boundaries only (spec §5,
//! §9 "Cancellation... expressed as a deadline on the cancel signal").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        CancelToken {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: None,
        }
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        CancelToken {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_canceled(&self) -> bool {
        if self.flag.load(Ordering::SeqCst) {
            return true;
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn fresh_token_is_not_canceled() {
        let token = CancelToken::new();
        assert!(!token.is_canceled());
    }

    #[test]
    fn explicit_cancel_is_observed() {
        let token = CancelToken::new();
        token.cancel();
        assert!(token.is_canceled());
    }

    #[test]
    fn cancel_is_observed_through_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_canceled());
    }

    #[test]
    fn deadline_in_the_past_is_already_canceled() {
        let token = CancelToken::with_deadline(Instant::now() - Duration::from_secs(1));
        assert!(token.is_canceled());
    }

    #[test]
    fn deadline_in_the_future_is_not_yet_canceled() {
        let token = CancelToken::with_deadline(Instant::now() + Duration::from_secs(60));
        assert!(!token.is_canceled());
    }
}
