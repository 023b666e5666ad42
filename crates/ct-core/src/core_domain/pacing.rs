use crate::core::PacingDelay;

// ---------------------------------------------------------------------------
// TokenBucket: outbound call pacing (pure, no system clock)
// ---------------------------------------------------------------------------

/// Token bucket refilled with one token every `interval_ms`, holding at most
/// `burst` tokens.
///
/// Tracked as a theoretical arrival time (GCRA form) so no floating point or
/// background refill is needed. With `burst == 1` calls are spaced at least
/// `interval_ms` apart. An interval of zero never refuses.
pub struct TokenBucket {
    interval_ms: u64,
    burst: u32,
    theoretical_arrival_ms: u64,
}

impl TokenBucket {
    pub fn new(interval_ms: u64, burst: u32) -> Self {
        Self {
            interval_ms,
            burst: burst.max(1),
            theoretical_arrival_ms: 0,
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Take a token at `now_ms`.
    ///
    /// On success the token is consumed. On refusal nothing changes and the
    /// returned delay says how long to wait before the next token exists.
    pub fn try_acquire(&mut self, now_ms: u64) -> Result<(), PacingDelay> {
        if self.interval_ms == 0 {
            return Ok(());
        }

        let tolerance = self.interval_ms * u64::from(self.burst - 1);
        let allowed_at = self.theoretical_arrival_ms.saturating_sub(tolerance);
        if now_ms < allowed_at {
            return Err(PacingDelay {
                wait_ms: allowed_at - now_ms,
            });
        }

        self.theoretical_arrival_ms = self.theoretical_arrival_ms.max(now_ms) + self.interval_ms;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_is_free() {
        let mut bucket = TokenBucket::new(300, 1);
        assert!(bucket.try_acquire(0).is_ok());
    }

    #[test]
    fn test_single_token_spaces_calls_by_interval() {
        let mut bucket = TokenBucket::new(300, 1);
        bucket.try_acquire(1_000).unwrap();

        let delay = bucket.try_acquire(1_100).unwrap_err();
        assert_eq!(delay.wait_ms, 200);

        // A refusal does not consume anything.
        let delay = bucket.try_acquire(1_250).unwrap_err();
        assert_eq!(delay.wait_ms, 50);

        assert!(bucket.try_acquire(1_300).is_ok());
        assert!(bucket.try_acquire(1_400).is_err());
    }

    #[test]
    fn test_burst_allows_back_to_back_calls() {
        let mut bucket = TokenBucket::new(100, 3);
        assert!(bucket.try_acquire(500).is_ok());
        assert!(bucket.try_acquire(500).is_ok());
        assert!(bucket.try_acquire(500).is_ok());

        let delay = bucket.try_acquire(500).unwrap_err();
        assert_eq!(delay.wait_ms, 100);
        assert!(bucket.try_acquire(600).is_ok());
    }

    #[test]
    fn test_idle_time_does_not_bank_beyond_burst() {
        let mut bucket = TokenBucket::new(100, 2);
        bucket.try_acquire(0).unwrap();

        // Long idle: only `burst` tokens are available afterwards.
        assert!(bucket.try_acquire(10_000).is_ok());
        assert!(bucket.try_acquire(10_000).is_ok());
        assert!(bucket.try_acquire(10_000).is_err());
    }

    #[test]
    fn test_zero_interval_never_refuses() {
        let mut bucket = TokenBucket::new(0, 1);
        for _ in 0..100 {
            assert!(bucket.try_acquire(0).is_ok());
        }
    }

    #[test]
    fn test_zero_burst_treated_as_one() {
        let mut bucket = TokenBucket::new(50, 0);
        assert!(bucket.try_acquire(0).is_ok());
        assert_eq!(bucket.try_acquire(10).unwrap_err().wait_ms, 40);
    }
}
