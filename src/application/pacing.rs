use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// Default pause between upstream requests in batch runs (milliseconds)
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 250;

/// Enforces a minimum gap between successive upstream requests.
///
/// Shared by every stage of one invocation. Offline modes never call it.
#[derive(Debug)]
pub struct RequestPacer {
    delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RequestPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_request: Mutex::new(None),
        }
    }

    /// Pacer that never sleeps
    pub fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until `delay` has passed since the previous request, then
    /// marks the start of a new one.
    pub async fn wait(&self) {
        let remaining = self.remaining();
        if !remaining.is_zero() {
            tokio::time::sleep(remaining).await;
        }
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(Instant::now());
        }
    }

    fn remaining(&self) -> Duration {
        let Ok(last) = self.last_request.lock() else {
            return Duration::ZERO;
        };
        match *last {
            Some(at) => self.delay.saturating_sub(at.elapsed()),
            None => Duration::ZERO,
        }
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_REQUEST_DELAY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let pacer = RequestPacer::new(Duration::from_secs(5));
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_successive_requests_are_spaced() {
        let pacer = RequestPacer::new(Duration::from_secs(2));
        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_unpaced_never_sleeps() {
        let pacer = RequestPacer::unpaced();
        let start = std::time::Instant::now();
        for _ in 0..10 {
            pacer.wait().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
