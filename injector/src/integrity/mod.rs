mod verifier;

pub use verifier::{verify_file, VerificationOutcome};

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::ops::Range;

/// Gap and duplicate analysis of the counters recovered from persisted logs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntegrityReport {
    pub total: u64,
    pub unique: u64,
    pub first_counter: Option<u64>,
    pub last_counter: Option<u64>,
    /// Counter value -> number of occurrences, for values seen more than once.
    pub duplicates: BTreeMap<u64, u64>,
    /// Missing half-open ranges, ordered.
    pub gaps: Vec<Range<u64>>,
    /// Size of the expected range `[0, expected)`, when known.
    pub expected: Option<u64>,
    /// Distinct counters at or above `expected`, which the injector never produced.
    pub unexpected: u64,
}

impl IntegrityReport {
    /// Without `expected`, gaps are only looked for between the first and the
    /// last counter seen; with it, the whole `[0, expected)` range is checked.
    pub fn from_counters<I>(counters: I, expected: Option<u64>) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut occurrences = BTreeMap::new();
        let mut total = 0;
        for counter in counters {
            *occurrences.entry(counter).or_insert(0u64) += 1;
            total += 1;
        }

        let duplicates = occurrences
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(counter, count)| (*counter, *count))
            .collect();

        let first_counter = occurrences.keys().next().copied();
        let last_counter = occurrences.keys().next_back().copied();

        let unexpected = match expected {
            Some(expected) => occurrences.range(expected..).count() as u64,
            None => 0,
        };

        let mut gaps = Vec::new();
        let mut next_expected = match expected {
            Some(_) => Some(0),
            None => first_counter,
        };
        for counter in occurrences.keys() {
            if let Some(expected) = expected {
                if *counter >= expected {
                    break;
                }
            }
            if let Some(next) = next_expected {
                if *counter > next {
                    gaps.push(next..*counter);
                }
            }
            next_expected = Some(counter + 1);
        }
        if let (Some(expected), Some(next)) = (expected, next_expected) {
            if next < expected {
                gaps.push(next..expected);
            }
        }

        Self {
            total,
            unique: occurrences.len() as u64,
            first_counter,
            last_counter,
            duplicates,
            gaps,
            expected,
            unexpected,
        }
    }

    pub fn missing_count(&self) -> u64 {
        self.gaps.iter().map(|gap| gap.end - gap.start).sum()
    }

    pub fn duplicate_count(&self) -> u64 {
        self.duplicates.values().map(|count| count - 1).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.gaps.is_empty() && self.duplicates.is_empty() && self.unexpected == 0
    }
}

impl Display for IntegrityReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Integrity Report ===")?;
        writeln!(f, "Total messages: {}", self.total)?;
        writeln!(f, "Unique messages: {}", self.unique)?;
        match (self.first_counter, self.last_counter) {
            (Some(first), Some(last)) => writeln!(f, "Counter range: {first}..={last}")?,
            _ => writeln!(f, "Counter range: none")?,
        }
        if let Some(expected) = self.expected {
            writeln!(f, "Expected range: 0..{expected}")?;
        }
        writeln!(
            f,
            "Missing: {} in {} gap(s)",
            self.missing_count(),
            self.gaps.len()
        )?;
        for gap in self.gaps.iter().take(10) {
            writeln!(f, "  missing {}..{}", gap.start, gap.end)?;
        }
        writeln!(f, "Duplicates: {}", self.duplicate_count())?;
        for (counter, count) in self.duplicates.iter().take(10) {
            writeln!(f, "  #{counter} seen {count} times")?;
        }
        write!(f, "Unexpected: {}", self.unexpected)
    }
}
