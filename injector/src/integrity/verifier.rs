use super::IntegrityReport;
use crate::error::InjectorError;
use crate::template::CounterExtractor;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOutcome {
    pub report: IntegrityReport,
    /// Lines in which no counter could be found.
    pub unmatched_lines: u64,
    /// Missing counters accepted as legitimate, e.g. the run's send errors.
    pub tolerated_gaps: u64,
}

impl VerificationOutcome {
    pub fn passed(&self) -> bool {
        self.report.duplicates.is_empty()
            && self.report.unexpected == 0
            && self.report.missing_count() <= self.tolerated_gaps
    }
}

/// Reads persisted log lines from `path` and checks their counters.
pub async fn verify_file(
    path: &Path,
    extractor: &CounterExtractor,
    expected: Option<u64>,
    tolerated_gaps: u64,
) -> Result<VerificationOutcome, InjectorError> {
    info!(
        "Verifying counters in: {} using pattern: {}",
        path.display(),
        extractor.pattern()
    );
    let file = File::open(path).await?;
    let mut reader = BufReader::new(file);
    let mut buffer = Vec::new();
    let mut counters = Vec::new();
    let mut unmatched_lines = 0;
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer).await? == 0 {
            break;
        }
        // Agents may persist bytes that are not valid UTF-8.
        let line = String::from_utf8_lossy(&buffer);
        let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');
        match extractor.extract(line) {
            Some(counter) => counters.push(counter),
            None => {
                unmatched_lines += 1;
                debug!("No counter found in line: {line}");
            }
        }
    }

    Ok(VerificationOutcome {
        report: IntegrityReport::from_counters(counters, expected),
        unmatched_lines,
        tolerated_gaps,
    })
}
