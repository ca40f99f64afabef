//! Per-round result reporting
//!
//! The Director appends one snapshot per round; the log renders the
//! append-only results format consumed by external reporting tooling:
//!
//! ```text
//! at step 1 S = 975; E = 25; I = 0; R = 0
//! ```
//!
//! Steps in the rendered lines are 1-based (matching the historical
//! results files) while round indices inside the simulator are 0-based.
//! The format is stable across reconciliation-policy changes.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// One per-round compartment snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// Round index (0-based)
    pub round: u64,

    /// Compartment counts at the end of the round
    pub counts: Vec<u64>,
}

/// Ordered log of per-round snapshots
///
/// # Example
/// ```
/// use multilevel_simulator_core_rs::report::RoundLog;
///
/// let mut log = RoundLog::new(vec![
///     "S".to_string(), "E".to_string(), "I".to_string(), "R".to_string(),
/// ]);
/// log.record(0, vec![975, 25, 0, 0]);
///
/// assert_eq!(log.lines(), vec!["at step 1 S = 975; E = 25; I = 0; R = 0"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundLog {
    labels: Vec<String>,
    records: Vec<RoundRecord>,
}

impl RoundLog {
    /// Create an empty log for the given bucket labels
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            records: Vec::new(),
        }
    }

    /// Rebuild a log from existing records (checkpoint restore)
    pub fn from_records(labels: Vec<String>, records: Vec<RoundRecord>) -> Self {
        Self { labels, records }
    }

    /// Append a snapshot for `round`
    pub fn record(&mut self, round: u64, counts: Vec<u64>) {
        self.records.push(RoundRecord { round, counts });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All recorded snapshots in round order
    pub fn records(&self) -> &[RoundRecord] {
        &self.records
    }

    /// Bucket labels, in defined order
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Most recent snapshot
    pub fn last(&self) -> Option<&RoundRecord> {
        self.records.last()
    }

    /// Render one record as a results line
    pub fn line(&self, record: &RoundRecord) -> String {
        let buckets: Vec<String> = self
            .labels
            .iter()
            .zip(&record.counts)
            .map(|(label, count)| format!("{label} = {count}"))
            .collect();
        format!("at step {} {}", record.round + 1, buckets.join("; "))
    }

    /// Render all records as results lines
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(|r| self.line(r)).collect()
    }

    /// Write all lines to an append-only sink, one per round
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for record in &self.records {
            writeln!(writer, "{}", self.line(record))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seir_log() -> RoundLog {
        RoundLog::new(vec![
            "S".to_string(),
            "E".to_string(),
            "I".to_string(),
            "R".to_string(),
        ])
    }

    #[test]
    fn test_line_format_matches_results_sink() {
        let mut log = seir_log();
        log.record(0, vec![975, 25, 0, 0]);
        log.record(1, vec![960, 30, 8, 2]);

        assert_eq!(
            log.lines(),
            vec![
                "at step 1 S = 975; E = 25; I = 0; R = 0",
                "at step 2 S = 960; E = 30; I = 8; R = 2",
            ]
        );
    }

    #[test]
    fn test_write_to_sink() {
        let mut log = seir_log();
        log.record(0, vec![990, 10, 0, 0]);

        let mut sink = Vec::new();
        log.write_to(&mut sink).unwrap();
        assert_eq!(
            String::from_utf8(sink).unwrap(),
            "at step 1 S = 990; E = 10; I = 0; R = 0\n"
        );
    }

    #[test]
    fn test_last_and_len() {
        let mut log = seir_log();
        assert!(log.is_empty());
        log.record(0, vec![990, 10, 0, 0]);
        log.record(1, vec![980, 20, 0, 0]);
        assert_eq!(log.len(), 2);
        assert_eq!(log.last().unwrap().round, 1);
    }
}
