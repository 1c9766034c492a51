//! Bounded polling with an injectable sleep.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

/// Source of delays. Production uses the tokio timer; tests record the
/// requested durations and return immediately.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// [`Sleeper`] backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// How many times to try and how long to wait between tries.
///
/// The attempt count is always at least one; there is no unbounded mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    attempts: u32,
    interval: Duration,
}

impl PollPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 15;
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            interval,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Upper bound on time spent sleeping between attempts.
    pub fn max_wait(&self) -> Duration {
        self.interval * (self.attempts - 1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTEMPTS, Self::DEFAULT_INTERVAL)
    }
}

/// Run `attempt` until it yields a value or the policy is exhausted.
///
/// `attempt` receives the 1-based attempt number. The sleeper is invoked
/// between attempts only, never after the last one.
pub async fn poll_until<T, F, Fut>(policy: &PollPolicy, sleeper: &dyn Sleeper, mut attempt: F) -> Option<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for n in 1..=policy.attempts {
        if let Some(value) = attempt(n).await {
            return Some(value);
        }
        if n < policy.attempts {
            sleeper.sleep(policy.interval).await;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSleeper {
        slept: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.slept.lock().unwrap().push(duration);
        }
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = PollPolicy::new(0, Duration::from_secs(1));
        assert_eq!(policy.attempts(), 1);
        assert_eq!(policy.max_wait(), Duration::ZERO);
    }

    #[test]
    fn test_default_bound() {
        let policy = PollPolicy::default();
        assert_eq!(policy.attempts(), 15);
        assert_eq!(policy.max_wait(), Duration::from_secs(28));
    }

    #[tokio::test]
    async fn test_exhausts_exactly_the_attempt_count() {
        let sleeper = RecordingSleeper::default();
        let mut calls = Vec::new();

        let result: Option<()> = poll_until(&PollPolicy::default(), &sleeper, |n| {
            calls.push(n);
            async { None }
        })
        .await;

        assert!(result.is_none());
        assert_eq!(calls, (1..=15).collect::<Vec<_>>());
        let slept = sleeper.slept.lock().unwrap();
        assert_eq!(slept.len(), 14);
        assert!(slept.iter().all(|d| *d == Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_returns_first_hit() {
        let sleeper = RecordingSleeper::default();
        let result = poll_until(&PollPolicy::default(), &sleeper, |n| async move {
            (n == 3).then_some(n)
        })
        .await;

        assert_eq!(result, Some(3));
        assert_eq!(sleeper.slept.lock().unwrap().len(), 2);
    }
}
