use std::time::Duration;

use tokio::time::Instant;

/// Drops trigger calls that arrive within `interval` of the last accepted one.
///
/// Meant for scroll-driven callers that may fire many "load more" triggers
/// per second; the feed itself already ignores triggers while fetching.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// Returns `true` and records the call if enough time has passed.
    pub fn ready(&mut self) -> bool {
        let now = Instant::now();
        if self
            .last
            .is_some_and(|last| now.duration_since(last) < self.interval)
        {
            return false;
        }
        self.last = Some(now);
        true
    }

    /// Time left until [`Debouncer::ready`] would accept a call.
    #[must_use]
    pub fn wait_time(&self) -> Duration {
        self.last.map_or(Duration::ZERO, |last| {
            self.interval.saturating_sub(last.elapsed())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn suppresses_calls_inside_interval() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        assert!(debouncer.ready());
        assert!(!debouncer.ready());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(!debouncer.ready());

        tokio::time::advance(Duration::from_millis(200)).await;
        assert!(debouncer.ready());
        assert!(!debouncer.ready());
    }

    #[tokio::test(start_paused = true)]
    async fn wait_time_counts_down_to_next_accepted_call() {
        let mut debouncer = Debouncer::new(Duration::from_millis(250));
        assert_eq!(debouncer.wait_time(), Duration::ZERO);
        assert!(debouncer.ready());
        assert_eq!(debouncer.wait_time(), Duration::from_millis(250));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(debouncer.wait_time(), Duration::from_millis(150));

        tokio::time::sleep(debouncer.wait_time()).await;
        assert_eq!(debouncer.wait_time(), Duration::ZERO);
        assert!(debouncer.ready());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_never_suppresses() {
        let mut debouncer = Debouncer::new(Duration::ZERO);
        assert!(debouncer.ready());
        assert!(debouncer.ready());
    }
}
