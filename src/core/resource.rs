//! Resource manager — bounded token bucket.
//!
//! Single lock guarding a mutable counter, clamped at construction, with
//! min-with-available allocation semantics rather than a hard allow/deny
//! gate.

use crate::error::CoreError;
use parking_lot::Mutex;
use std::sync::Arc;

pub trait ResourceManager: Send + Sync {
    /// Current tokens available.
    fn available(&self) -> f64;

    /// Allocate up to `amount` tokens, debiting by the amount actually
    /// granted. Returns 0 if `amount <= 0` or no tokens remain.
    fn request(&self, amount: f64) -> f64;

    /// Return `amount` tokens to the pool, clamped at `max_tokens`.
    /// Non-positive amounts are ignored.
    fn release(&self, amount: f64);
}

/// Plain bounded token bucket, thread-safe via a single mutex.
pub struct TokenBucket {
    max_tokens: f64,
    tokens: Mutex<f64>,
}

impl TokenBucket {
    pub fn new(max_tokens: f64) -> Self {
        let max_tokens = max_tokens.max(0.0);
        TokenBucket {
            max_tokens,
            tokens: Mutex::new(max_tokens),
        }
    }
}

impl ResourceManager for TokenBucket {
    fn available(&self) -> f64 {
        *self.tokens.lock()
    }

    fn request(&self, amount: f64) -> f64 {
        if amount <= 0.0 {
            return 0.0;
        }
        let mut tokens = self.tokens.lock();
        if *tokens <= 0.0 {
            return 0.0;
        }
        let allocated = amount.min(*tokens);
        *tokens -= allocated;
        allocated
    }

    fn release(&self, amount: f64) {
        if amount <= 0.0 {
            return;
        }
        let mut tokens = self.tokens.lock();
        *tokens = (*tokens + amount).min(self.max_tokens);
    }
}

/// Build a resource manager from the `token` tag, the only variant the
/// spec defines.
pub fn build_resource_manager(tag: &str, max_tokens: f64) -> Result<Arc<dyn ResourceManager>, CoreError> {
    match tag {
        "token" => Ok(Arc::new(TokenBucket::new(max_tokens))),
        other => Err(CoreError::InvalidConfig(format!(
            "unknown resource manager tag: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn negative_max_tokens_coerces_to_zero() {
        let bucket = TokenBucket::new(-5.0);
        assert_eq!(bucket.available(), 0.0);
    }

    #[test]
    fn request_returns_min_of_amount_and_available() {
        let bucket = TokenBucket::new(10.0);
        assert_eq!(bucket.request(4.0), 4.0);
        assert_eq!(bucket.available(), 6.0);
        assert_eq!(bucket.request(100.0), 6.0);
        assert_eq!(bucket.available(), 0.0);
        assert_eq!(bucket.request(1.0), 0.0);
    }

    #[test]
    fn non_positive_requests_and_releases_are_no_ops() {
        let bucket = TokenBucket::new(10.0);
        assert_eq!(bucket.request(0.0), 0.0);
        assert_eq!(bucket.request(-3.0), 0.0);
        bucket.release(0.0);
        bucket.release(-3.0);
        assert_eq!(bucket.available(), 10.0);
    }

    #[test]
    fn release_clamps_at_max() {
        let bucket = TokenBucket::new(10.0);
        bucket.request(5.0);
        bucket.release(100.0);
        assert_eq!(bucket.available(), 10.0);
    }

    #[test]
    fn concurrent_request_release_preserves_invariant() {
        let bucket = Arc::new(TokenBucket::new(1000.0));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let b = bucket.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    let got = b.request(1.0);
                    b.release(got);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(bucket.available(), 1000.0);
        assert!(bucket.available() >= 0.0 && bucket.available() <= 1000.0);
    }

    #[test]
    fn unknown_tag_is_invalid_config() {
        let err = build_resource_manager("not-a-tag", 10.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }

    #[test]
    fn token_tag_builds() {
        let rm = build_resource_manager("token", 10.0).unwrap();
        assert_eq!(rm.available(), 10.0);
    }
}
