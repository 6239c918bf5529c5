//! Driver: a named, weighted, opaquely-executable strategy.
//!
//! The orchestrator treats a driver as an external collaborator with a
//! synchronous run contract: it is handed the task payload, does its work,
//! and reports success plus an opaque result value. What the work actually
//! does (send an SMS through one provider, hit one mirror, ...) is none of
//! the core's business.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;

/// What a driver does when asked to run.
///
/// Implementations must be `Send + Sync` so a task can be shared across
/// threads behind a lock. Plain closures qualify via the blanket impl.
pub trait DriverWork: Send + Sync {
    fn perform(&self, data: Option<&Value>) -> WorkReport;
}

impl<F> DriverWork for F
where
    F: Fn(Option<&Value>) -> WorkReport + Send + Sync,
{
    fn perform(&self, data: Option<&Value>) -> WorkReport {
        self(data)
    }
}

/// What the work itself hands back: a success flag and an opaque output.
///
/// Kept flexible as `serde_json::Value` so driver authors can evolve their
/// result shape without touching the core.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkReport {
    pub success: bool,
    pub output: Value,
}

impl WorkReport {
    pub fn success(output: impl Into<Value>) -> Self {
        Self {
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<Value>) -> Self {
        Self {
            success: false,
            output: output.into(),
        }
    }
}

/// One timed execution of a driver: the work's report plus how long it took.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverReport {
    pub success: bool,
    pub result: Value,
    pub elapsed: Duration,
}

/// A registered execution strategy.
///
/// - `weight` governs selection probability (0 removes the driver from the
///   weighted draw; it stays eligible for the uniform fallback).
/// - `is_backup` marks the driver for failover, tracked by the task in a
///   separate priority-ordered list.
#[derive(Clone)]
pub struct Driver {
    name: String,
    weight: u32,
    is_backup: bool,
    work: Arc<dyn DriverWork>,
}

impl Driver {
    pub(crate) fn new(
        name: impl Into<String>,
        weight: u32,
        is_backup: bool,
        work: Arc<dyn DriverWork>,
    ) -> Self {
        Self {
            name: name.into(),
            weight,
            is_backup,
            work,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn is_backup(&self) -> bool {
        self.is_backup
    }

    /// Execute the work synchronously and time it.
    ///
    /// Blocks the caller for the full duration; no timeout is enforced here.
    /// Drivers that need one must implement it inside their own work.
    pub fn run(&self, data: Option<&Value>) -> DriverReport {
        let started = Instant::now();
        let report = self.work.perform(data);
        DriverReport {
            success: report.success,
            result: report.output,
            elapsed: started.elapsed(),
        }
    }
}

impl fmt::Debug for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Driver")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("is_backup", &self.is_backup)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_times_the_work_and_carries_the_output() {
        let driver = Driver::new(
            "alpha",
            1,
            false,
            Arc::new(|_data: Option<&Value>| WorkReport::success(json!({"sent": true}))),
        );

        let report = driver.run(None);
        assert!(report.success);
        assert_eq!(report.result, json!({"sent": true}));
    }

    #[test]
    fn work_receives_the_task_payload() {
        let driver = Driver::new(
            "echo",
            1,
            false,
            Arc::new(|data: Option<&Value>| {
                WorkReport::success(data.cloned().unwrap_or(Value::Null))
            }),
        );

        let payload = json!({"to": "someone"});
        let report = driver.run(Some(&payload));
        assert_eq!(report.result, payload);
    }

    #[test]
    fn failure_report_is_not_an_error() {
        let driver = Driver::new(
            "down",
            1,
            true,
            Arc::new(|_: Option<&Value>| WorkReport::failure("provider unreachable")),
        );

        let report = driver.run(None);
        assert!(!report.success);
        assert_eq!(report.result, json!("provider unreachable"));
    }
}
