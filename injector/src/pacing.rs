use crate::error::InjectorError;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Spaces fixed-size batches against an advancing absolute deadline, so the
/// time spent sending a batch never accumulates into rate drift.
#[derive(Debug)]
pub struct PacingScheduler {
    batch_size: u32,
    batch_interval: Duration,
    next_deadline: Instant,
}

impl PacingScheduler {
    pub fn new(batch_size: u32, target_rate: u32) -> Result<Self, InjectorError> {
        Ok(Self {
            batch_size,
            batch_interval: batch_interval(batch_size, target_rate)?,
            next_deadline: Instant::now(),
        })
    }

    /// Anchors the deadline sequence at `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_deadline = now;
    }

    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    pub fn batch_interval(&self) -> Duration {
        self.batch_interval
    }

    pub fn next_deadline(&self) -> Instant {
        self.next_deadline
    }

    /// Advances the deadline by one interval and sleeps until it is reached.
    /// Returns `false` when the wait was interrupted by cancellation.
    pub async fn wait_for_next_batch(&mut self, shutdown: &CancellationToken) -> bool {
        self.next_deadline += self.batch_interval;
        tokio::select! {
            _ = shutdown.cancelled() => false,
            _ = sleep_until(self.next_deadline) => true,
        }
    }
}

/// `batch_size / target_rate` seconds, kept at nanosecond resolution.
pub fn batch_interval(batch_size: u32, target_rate: u32) -> Result<Duration, InjectorError> {
    if target_rate == 0 || batch_size == 0 {
        return Err(InjectorError::InvalidConfiguration(format!(
            "cannot pace {batch_size} message(s) per batch at {target_rate} msg/s"
        )));
    }
    let nanos = batch_size as u128 * NANOS_PER_SECOND / target_rate as u128;
    Ok(Duration::from_nanos(nanos as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_should_keep_fractional_seconds() {
        assert_eq!(batch_interval(100, 1000).unwrap(), Duration::from_millis(100));
        assert_eq!(batch_interval(1, 3).unwrap(), Duration::from_nanos(333_333_333));
        assert_eq!(batch_interval(250, 100).unwrap(), Duration::from_millis(2500));
    }

    #[test]
    fn zero_rate_or_batch_should_be_rejected() {
        assert!(batch_interval(100, 0).is_err());
        assert!(batch_interval(0, 100).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn deadlines_should_not_drift_with_batch_work() {
        let mut scheduler = PacingScheduler::new(10, 100).unwrap();
        let started = Instant::now();
        scheduler.start(started);

        for _ in 0..10 {
            // Simulated send time eats part of every interval.
            tokio::time::sleep(Duration::from_millis(30)).await;
            assert!(scheduler.wait_for_next_batch(&CancellationToken::new()).await);
        }

        assert_eq!(started.elapsed(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn overdue_deadline_should_not_sleep() {
        let mut scheduler = PacingScheduler::new(10, 100).unwrap();
        let started = Instant::now();
        scheduler.start(started);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(scheduler.wait_for_next_batch(&CancellationToken::new()).await);
        assert!(scheduler.wait_for_next_batch(&CancellationToken::new()).await);

        assert_eq!(started.elapsed(), Duration::from_millis(250));
        assert_eq!(scheduler.next_deadline(), started + Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_should_interrupt_wait() {
        let mut scheduler = PacingScheduler::new(1000, 1).unwrap();
        scheduler.start(Instant::now());
        let shutdown = CancellationToken::new();
        let canceller = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let started = Instant::now();
        assert!(!scheduler.wait_for_next_batch(&shutdown).await);
        assert_eq!(started.elapsed(), Duration::from_millis(50));
    }
}
