//! Fixed-window limiter guarding the hosted-model endpoint.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[cfg(test)]
use std::sync::atomic::{AtomicU64, Ordering};

/// Millisecond time source. Only differences between readings are meaningful.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

/// Hand-driven clock for tests.
#[cfg(test)]
#[derive(Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

#[cfg(test)]
impl ManualClock {
    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct Window {
    started_ms: u64,
    count: u32,
}

pub struct RateLimiter {
    max_requests: u32,
    window_ms: u64,
    clock: Arc<dyn Clock>,
    window: Mutex<Window>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let started_ms = clock.now_ms();
        Self {
            max_requests,
            window_ms: u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            clock,
            window: Mutex::new(Window {
                started_ms,
                count: 0,
            }),
        }
    }

    pub fn with_system_clock(max_requests: u32, window: Duration) -> Self {
        Self::new(max_requests, window, Arc::new(SystemClock::default()))
    }

    /// Admits one request, or returns the milliseconds until the current window closes.
    pub fn try_acquire(&self) -> Result<(), u64> {
        let now = self.clock.now_ms();
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());

        let elapsed = now.saturating_sub(window.started_ms);
        if elapsed >= self.window_ms {
            window.started_ms = now;
            window.count = 0;
        }

        if window.count >= self.max_requests {
            let wait = self.window_ms - now.saturating_sub(window.started_ms);
            return Err(wait);
        }

        window.count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max: u32, window_ms: u64) -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::default());
        let limiter = RateLimiter::new(max, Duration::from_millis(window_ms), clock.clone());
        (clock, limiter)
    }

    #[test]
    fn test_rejects_over_limit_with_exact_wait() {
        let (clock, limiter) = limiter(2, 1000);
        assert_eq!(limiter.try_acquire(), Ok(()));
        assert_eq!(limiter.try_acquire(), Ok(()));
        assert_eq!(limiter.try_acquire(), Err(1000));

        clock.advance(Duration::from_millis(400));
        assert_eq!(limiter.try_acquire(), Err(600));
    }

    #[test]
    fn test_new_window_admits_again() {
        let (clock, limiter) = limiter(1, 1000);
        assert_eq!(limiter.try_acquire(), Ok(()));
        assert!(limiter.try_acquire().is_err());

        clock.advance(Duration::from_millis(1000));
        assert_eq!(limiter.try_acquire(), Ok(()));
        assert_eq!(limiter.try_acquire(), Err(1000));
    }

    #[test]
    fn test_window_starts_at_first_request_after_reset() {
        let (clock, limiter) = limiter(1, 1000);
        clock.advance(Duration::from_millis(5000));
        assert_eq!(limiter.try_acquire(), Ok(()));
        clock.advance(Duration::from_millis(250));
        assert_eq!(limiter.try_acquire(), Err(750));
    }
}
