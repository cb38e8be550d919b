use human_repr::HumanCount;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Point-in-time copy of the run counters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSnapshot {
    pub elapsed: Duration,
    pub messages: u64,
    pub bytes: u64,
    pub errors: u64,
}

impl StatsSnapshot {
    pub fn message_rate(&self) -> f64 {
        self.per_second(self.messages)
    }

    pub fn throughput_kilobytes_per_second(&self) -> f64 {
        self.per_second(self.bytes) / 1024.0
    }

    fn per_second(&self, value: u64) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            value as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Progress line, meant to be overwritten in place.
    pub fn progress_line(&self) -> String {
        format!("\r{self}")
    }

    /// Multi-line summary printed once, when the run is drained.
    pub fn final_summary(&self, next_counter: u64) -> String {
        format!(
            "\r\n=== Final Statistics ===\n{self}\nNext counter: {next_counter} | Total sent: {}\n",
            self.bytes.human_count_bytes()
        )
    }
}

impl Display for StatsSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Elapsed: {:.2}s | Messages: {} | Rate: {:.2} msg/s | Throughput: {:.2} KB/s | Errors: {}",
            self.elapsed.as_secs_f64(),
            self.messages,
            self.message_rate(),
            self.throughput_kilobytes_per_second(),
            self.errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(elapsed: Duration) -> StatsSnapshot {
        StatsSnapshot {
            elapsed,
            messages: 1500,
            bytes: 3072,
            errors: 2,
        }
    }

    #[test]
    fn rates_should_be_zero_without_elapsed_time() {
        let snapshot = snapshot(Duration::ZERO);
        assert_eq!(snapshot.message_rate(), 0.0);
        assert_eq!(snapshot.throughput_kilobytes_per_second(), 0.0);
    }

    #[test]
    fn progress_line_should_report_all_counters() {
        let line = snapshot(Duration::from_millis(1500)).progress_line();
        assert_eq!(
            line,
            "\rElapsed: 1.50s | Messages: 1500 | Rate: 1000.00 msg/s | Throughput: 2.00 KB/s | Errors: 2"
        );
        assert!(!line.contains('\n'));
    }

    #[test]
    fn final_summary_should_be_labeled() {
        let summary = snapshot(Duration::from_secs(3)).final_summary(1502);
        let lines: Vec<&str> = summary.trim().lines().collect();

        assert_eq!(lines[0], "=== Final Statistics ===");
        assert_eq!(
            lines[1],
            "Elapsed: 3.00s | Messages: 1500 | Rate: 500.00 msg/s | Throughput: 1.00 KB/s | Errors: 2"
        );
        assert!(lines[2].starts_with("Next counter: 1502 | Total sent: "));
    }
}
