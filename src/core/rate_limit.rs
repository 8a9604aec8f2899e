use crate::errors::{AppError, AppResult};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

/// Admission control for repeated calls keyed by actor.
pub trait RateLimiter {
    fn check(&self, key: &str) -> AppResult<()>;
}

/// Sliding-window limiter: at most `max_calls` admitted calls per key in
/// any `window`. State lives as long as the limiter value.
pub struct SlidingWindowLimiter {
    max_calls: usize,
    window: Duration,
    hits: RefCell<HashMap<String, VecDeque<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            max_calls,
            window,
            hits: RefCell::new(HashMap::new()),
        }
    }

    pub fn check_at(&self, key: &str, now: Instant) -> AppResult<()> {
        let mut hits = self.hits.borrow_mut();
        let q = hits.entry(key.to_string()).or_default();

        while let Some(front) = q.front() {
            if now.duration_since(*front) >= self.window {
                q.pop_front();
            } else {
                break;
            }
        }

        if q.len() >= self.max_calls {
            return Err(AppError::RateLimited {
                max_calls: self.max_calls,
                window_secs: self.window.as_secs(),
            });
        }

        q.push_back(now);
        Ok(())
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn check(&self, key: &str) -> AppResult<()> {
        self.check_at(key, Instant::now())
    }
}

/// Admits everything.
pub struct Unlimited;

impl RateLimiter for Unlimited {
    fn check(&self, _key: &str) -> AppResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_past_the_limit_within_window() {
        let limiter = SlidingWindowLimiter::new(2, Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(limiter.check_at("A", t0).is_ok());
        assert!(limiter.check_at("A", t0 + Duration::from_secs(1)).is_ok());
        assert!(matches!(
            limiter.check_at("A", t0 + Duration::from_secs(2)),
            Err(AppError::RateLimited { max_calls: 2, window_secs: 10 })
        ));
    }

    #[test]
    fn window_slides() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(limiter.check_at("A", t0).is_ok());
        assert!(limiter.check_at("A", t0 + Duration::from_secs(9)).is_err());
        assert!(limiter.check_at("A", t0 + Duration::from_secs(10)).is_ok());
    }

    #[test]
    fn keys_are_independent() {
        let limiter = SlidingWindowLimiter::new(1, Duration::from_secs(10));
        let t0 = Instant::now();
        assert!(limiter.check_at("A", t0).is_ok());
        assert!(limiter.check_at("B", t0).is_ok());
    }
}
