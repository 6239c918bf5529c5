//! Attempt records and the per-task result log.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::driver::DriverReport;
use super::ids::{AttemptId, RunId};

/// A single driver attempt: exactly one record per `Driver::run()` call,
/// in execution order. The log is the full audit trail of a run, including
/// the failed attempts preceding a successful backup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt: AttemptId,

    /// The `run()` invocation this attempt belongs to. The log is only
    /// cleared by an explicit reset, so records from successive runs
    /// coexist and stay attributable.
    pub run: RunId,

    /// Name of the driver that was attempted.
    pub driver: String,

    /// How long the driver's work took.
    pub elapsed: Duration,

    pub success: bool,

    /// Opaque result value produced by the driver.
    pub result: Value,
}

impl AttemptRecord {
    pub(crate) fn from_report(run: RunId, driver: &str, report: DriverReport) -> Self {
        Self {
            attempt: AttemptId::generate(),
            run,
            driver: driver.to_string(),
            elapsed: report.elapsed,
            success: report.success,
            result: report.result,
        }
    }
}

/// Append-only, time-ordered list of attempt outcomes.
///
/// Not cleared between successive `run()` calls on the same task; only an
/// explicit `Task::reset()` empties it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultLog {
    records: Vec<AttemptRecord>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, record: AttemptRecord) {
        self.records.push(record);
    }

    pub(crate) fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[AttemptRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&AttemptRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tally view for observability.
    pub fn counts(&self) -> AttemptCounts {
        let mut counts = AttemptCounts::default();
        for record in &self.records {
            counts.total += 1;
            if record.success {
                counts.succeeded += 1;
            } else {
                counts.failed += 1;
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a ResultLog {
    type Item = &'a AttemptRecord;
    type IntoIter = std::slice::Iter<'a, AttemptRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Attempt tally by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptCounts {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}
