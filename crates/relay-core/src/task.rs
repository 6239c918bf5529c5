//! Task: the single-task execution orchestrator.
//!
//! A task owns a registry of drivers, a priority-ordered backup list, the
//! hook registry and the result log, and drives one run at a time through
//! a small state machine (idle -> running -> finished). `run()` resolves a
//! driver (explicitly named or by weighted draw), then cascades through the
//! backup list until an attempt succeeds or the list is exhausted.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::backup::BackupList;
use crate::domain::{
    AttemptCounts, AttemptRecord, Driver, DriverSpec, DriverWork, Rejection, ResultLog, RunId,
    RunOutcome, RunValue, TaskStatus,
};
use crate::error::RelayError;
use crate::hooks::{HookPoint, HookRegistry, HookReply, HookResult};
use crate::select;

/// Single-task orchestrator.
///
/// Execution is synchronous and single-threaded: `run(&mut self)` blocks
/// for the whole cascade, and exclusive access doubles as the lock a
/// multi-threaded host needs — wrap the task in a `Mutex` and the
/// check-busy/set-running transition is atomic under it. Re-entry is
/// rejected, never queued; the busy guard also fires against a task left
/// wedged in `Running` by an earlier mid-run error (see [`Task::run`]).
pub struct Task {
    name: String,
    status: TaskStatus,
    data: Option<Value>,

    /// Driver registry plus registration order. The map is the source of
    /// truth; the order vector is what the weighted spans are built over.
    drivers: HashMap<String, Driver>,
    order: Vec<String>,

    backups: BackupList,

    /// Name of the most recently started attempt. Valid during and after a
    /// run; `reset()` does not touch it.
    current: Option<String>,

    results: ResultLog,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    hooks: HookRegistry,
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TaskStatus::Idle,
            data: None,
            drivers: HashMap::new(),
            order: Vec::new(),
            backups: BackupList::new(),
            current: None,
            results: ResultLog::new(),
            started_at: None,
            finished_at: None,
            hooks: HookRegistry::new(),
        }
    }

    /// Create a task and run its setup synchronously, then fire `ready`.
    ///
    /// The setup closure is where drivers and hooks get registered; the
    /// task is not handed out before it returns. `ready` fires exactly
    /// once, here — a task built with [`Task::new`] never fires it.
    pub fn create(
        name: impl Into<String>,
        data: Option<Value>,
        setup: impl FnOnce(&mut Task) -> Result<(), RelayError>,
    ) -> Result<Self, RelayError> {
        let mut task = Task::new(name);
        task.data = data;
        setup(&mut task)?;
        task.dispatch_hook(HookPoint::Ready, None)?;
        Ok(task)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Replace the payload handed to driver work.
    pub fn set_data(&mut self, data: Value) -> &mut Self {
        self.data = Some(data);
        self
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// The append-only attempt log. Cleared only by [`Task::reset`].
    pub fn results(&self) -> &ResultLog {
        &self.results
    }

    pub fn has_driver(&self, name: &str) -> bool {
        self.drivers.contains_key(name)
    }

    pub fn driver(&self, name: &str) -> Option<&Driver> {
        self.drivers.get(name)
    }

    /// Registered driver names, in registration order.
    pub fn driver_names(&self) -> &[String] {
        &self.order
    }

    /// Backup driver names, in failover priority order.
    pub fn backups(&self) -> &[String] {
        self.backups.names()
    }

    /// The driver of the most recently started attempt, if any.
    pub fn current_driver(&self) -> Option<&Driver> {
        self.current.as_deref().and_then(|name| self.drivers.get(name))
    }

    /// Register a hook callback. One slot per point; last write wins.
    pub fn hook<F>(&mut self, point: HookPoint, handler: F) -> &mut Self
    where
        F: Fn(&Task, Option<&Value>) -> HookResult + Send + Sync + 'static,
    {
        self.hooks.set(point, handler);
        self
    }

    /// Register a driver, create-if-absent.
    ///
    /// An already-registered name returns the existing driver untouched and
    /// fires no hooks. On actual creation `beforeCreateDriver` and
    /// `afterCreateDriver` fire around the insert, and a backup-flagged
    /// driver is appended to the backup list exactly once.
    pub fn register_driver(
        &mut self,
        spec: DriverSpec,
        work: impl DriverWork + 'static,
    ) -> Result<&Driver, RelayError> {
        let Some(name) = spec.name else {
            return Err(RelayError::Configuration(
                "driver spec has no resolvable name".to_string(),
            ));
        };

        if !self.drivers.contains_key(&name) {
            self.dispatch_hook(HookPoint::BeforeCreateDriver, None)?;

            let driver = Driver::new(name.clone(), spec.weight, spec.is_backup, Arc::new(work));
            debug!(
                task = %self.name,
                driver = %name,
                weight = spec.weight,
                is_backup = spec.is_backup,
                "driver registered"
            );
            self.order.push(name.clone());
            self.drivers.insert(name.clone(), driver);
            if spec.is_backup {
                self.backups.push(&name);
            }

            self.dispatch_hook(HookPoint::AfterCreateDriver, None)?;
        }

        self.drivers.get(&name).ok_or_else(|| RelayError::MissingDriver {
            task: self.name.clone(),
            driver: name,
        })
    }

    /// Add an already-registered driver to the backup list (idempotent).
    pub fn add_backup(&mut self, name: &str) -> Result<&mut Self, RelayError> {
        if !self.drivers.contains_key(name) {
            return Err(RelayError::MissingDriver {
                task: self.name.clone(),
                driver: name.to_string(),
            });
        }
        self.backups.push(name);
        Ok(self)
    }

    /// Remove a driver from the backup list. Unknown names are a no-op.
    pub fn remove_backup(&mut self, name: &str) -> &mut Self {
        self.backups.remove(name);
        self
    }

    /// Run the task.
    ///
    /// 1. Reject immediately when a run is in flight (no queuing).
    /// 2. Let the `beforeRun` hook gate the run.
    /// 3. Resolve the driver: explicit name, else weighted selection.
    /// 4. Promote the resolved name within the backup list.
    /// 5. Cascade: attempt, and on failure walk the backup list strictly
    ///    forward until success or exhaustion.
    /// 6. Let the `afterRun` hook override the aggregated value.
    ///
    /// Errors (missing driver, failing hook, broken invariant) propagate
    /// without restoring the status: a task that errored mid-run stays
    /// `Running` — and keeps rejecting — until [`Task::reset`]. Driver
    /// failure is not an error; it only feeds the cascade.
    pub fn run(&mut self, driver_name: Option<&str>) -> Result<RunOutcome, RelayError> {
        if self.status.is_running() {
            debug!(task = %self.name, "run rejected: busy");
            return Ok(RunOutcome::Rejected(Rejection::Busy));
        }

        if !self.dispatch_hook(HookPoint::BeforeRun, None)?.allows() {
            debug!(task = %self.name, "run vetoed by beforeRun hook");
            return Ok(RunOutcome::Rejected(Rejection::Vetoed));
        }

        self.status = TaskStatus::Running;
        self.started_at = Some(Utc::now());

        let first = match driver_name {
            Some(name) => name.to_string(),
            None => self.pick_driver_name()?,
        };
        self.backups.promote(&first);

        let run_id = RunId::generate();
        debug!(task = %self.name, run = %run_id, driver = %first, "run started");
        let success = self.run_cascade(first, run_id)?;

        self.status = TaskStatus::Finished;
        self.finished_at = Some(Utc::now());
        debug!(task = %self.name, run = %run_id, success, attempts = self.results.len(), "run finished");

        let raw = serde_json::to_value(self.results.records())
            .unwrap_or_else(|_| Value::Array(Vec::new()));
        let reply = self.dispatch_hook(HookPoint::AfterRun, Some(&raw))?;
        let value = match reply.override_value() {
            Some(value) => {
                debug!(task = %self.name, "afterRun hook overrode the run value");
                RunValue::Override(value)
            }
            None => RunValue::Results(self.results.records().to_vec()),
        };
        Ok(RunOutcome::Finished { success, value })
    }

    /// Clear the run state: status back to idle, result log emptied.
    ///
    /// Drivers, hooks, timestamps, `current`, and the backup list —
    /// including any reordering a previous run's promotion applied — are
    /// left as they are.
    pub fn reset(&mut self) -> &mut Self {
        self.status = TaskStatus::Idle;
        self.results.clear();
        self
    }

    fn dispatch_hook(&self, point: HookPoint, data: Option<&Value>) -> Result<HookReply, RelayError> {
        self.hooks.dispatch(point, self, data)
    }

    fn pick_driver_name(&self) -> Result<String, RelayError> {
        let ordered: Vec<&Driver> = self
            .order
            .iter()
            .filter_map(|name| self.drivers.get(name))
            .collect();
        select::pick_by_weight(&mut rand::thread_rng(), &ordered)
    }

    /// Sequential failover cascade, one attempt per iteration.
    ///
    /// The returned flag reflects only the outcome of the last attempt;
    /// the result log carries the full history.
    fn run_cascade(&mut self, first: String, run: RunId) -> Result<bool, RelayError> {
        let mut name = first;
        loop {
            if self.run_driver_once(&name, run)? {
                return Ok(true);
            }
            match self.backups.next_after(&name) {
                Some(next) => {
                    debug!(task = %self.name, failed = %name, next = %next, "cascading to backup");
                    name = next.to_string();
                }
                None => return Ok(false),
            }
        }
    }

    fn run_driver_once(&mut self, name: &str, run: RunId) -> Result<bool, RelayError> {
        let Some(driver) = self.drivers.get(name).cloned() else {
            return Err(RelayError::MissingDriver {
                task: self.name.clone(),
                driver: name.to_string(),
            });
        };

        // The hook already sees this attempt as current.
        self.current = Some(driver.name().to_string());
        self.dispatch_hook(HookPoint::BeforeRunDriver, None)?;

        let report = driver.run(self.data.as_ref());
        let success = report.success;
        debug!(
            task = %self.name,
            driver = %driver.name(),
            success,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "attempt finished"
        );
        self.results
            .push(AttemptRecord::from_report(run, driver.name(), report));

        self.dispatch_hook(HookPoint::AfterRunDriver, None)?;
        Ok(success)
    }
}

/// Serializable point-in-time view of a task, for status reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub name: String,
    pub status: TaskStatus,
    pub drivers: Vec<String>,
    pub backups: Vec<String>,
    pub current_driver: Option<String>,
    pub counts: AttemptCounts,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn snapshot(&self) -> TaskSnapshot {
        TaskSnapshot {
            name: self.name.clone(),
            status: self.status,
            drivers: self.order.clone(),
            backups: self.backups.names().to_vec(),
            current_driver: self.current.clone(),
            counts: self.results.counts(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("drivers", &self.order)
            .field("backups", &self.backups.names())
            .field("attempts", &self.results.len())
            .finish_non_exhaustive()
    }
}
