use super::RunStats;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Prints a progress line at most once per interval until cancelled.
#[derive(Debug)]
pub struct ProgressReporter {
    stats: Arc<RunStats>,
    shutdown: CancellationToken,
    interval: Duration,
}

impl ProgressReporter {
    pub fn new(stats: Arc<RunStats>, shutdown: CancellationToken) -> Self {
        Self {
            stats,
            shutdown,
            interval: DEFAULT_REPORT_INTERVAL,
        }
    }

    pub fn spawn(self) -> JoinHandle<u64> {
        tokio::spawn(self.run())
    }

    /// Returns the number of progress lines printed.
    async fn run(self) -> u64 {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut reports = 0;
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    print_in_place(&self.stats.snapshot().progress_line());
                    reports += 1;
                }
            }
        }
        trace!("Progress reporter stopped after {reports} report(s).");
        reports
    }
}

fn print_in_place(line: &str) {
    let mut stdout = std::io::stdout().lock();
    let _ = stdout.write_all(line.as_bytes());
    let _ = stdout.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn should_report_once_per_interval_until_cancelled() {
        let stats = Arc::new(RunStats::new());
        let shutdown = CancellationToken::new();
        let handle = ProgressReporter::new(stats, shutdown.clone()).spawn();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        shutdown.cancel();

        assert_eq!(handle.await.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_report_when_cancelled_before_first_interval() {
        let shutdown = CancellationToken::new();
        let handle = ProgressReporter::new(Arc::new(RunStats::new()), shutdown.clone()).spawn();

        tokio::time::sleep(Duration::from_millis(500)).await;
        shutdown.cancel();

        assert_eq!(handle.await.unwrap(), 0);
    }
}
