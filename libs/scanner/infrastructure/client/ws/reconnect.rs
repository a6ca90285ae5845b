use std::time::Duration;

/// Decides how long to wait before each reconnection attempt
pub trait ReconnectionStrategy: Send + Sync {
    /// Delay before attempt `attempt` (0-indexed), or `None` to give up
    fn next_delay(&self, attempt: usize) -> Option<Duration>;

    fn should_reconnect(&self, attempt: usize) -> bool;
}

/// `initial_delay * 2^attempt`, capped at `max_delay`
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    initial_delay: Duration,
    max_delay: Duration,
    max_attempts: Option<usize>,
}

impl ExponentialBackoff {
    /// `max_attempts: None` retries forever
    pub fn new(initial_delay: Duration, max_delay: Duration, max_attempts: Option<usize>) -> Self {
        Self {
            initial_delay,
            max_delay,
            max_attempts,
        }
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(30), None)
    }
}

impl ReconnectionStrategy for ExponentialBackoff {
    fn next_delay(&self, attempt: usize) -> Option<Duration> {
        if !self.should_reconnect(attempt) {
            return None;
        }

        let max_ms = self.max_delay.as_millis() as u64;
        let delay_ms = 2u64
            .checked_pow(attempt.min(u32::MAX as usize) as u32)
            .and_then(|factor| (self.initial_delay.as_millis() as u64).checked_mul(factor))
            .map_or(max_ms, |ms| ms.min(max_ms));

        Some(Duration::from_millis(delay_ms))
    }

    fn should_reconnect(&self, attempt: usize) -> bool {
        self.max_attempts.map_or(true, |max| attempt < max)
    }
}
