//! Run outcome: the typed return surface of `Task::run()`.

use serde_json::Value;

use super::attempt::AttemptRecord;

/// Why a `run()` call did not execute anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Another run is in flight; no queuing, no waiting.
    Busy,

    /// The `beforeRun` hook denied the run. Status was left untouched.
    Vetoed,
}

/// What `run()` hands back when the cascade finished.
#[derive(Debug, Clone, PartialEq)]
pub enum RunValue {
    /// The raw result log (all attempts, including any from prior runs
    /// that were not reset away).
    Results(Vec<AttemptRecord>),

    /// Replacement value produced by the `afterRun` hook.
    Override(Value),
}

impl RunValue {
    pub fn records(&self) -> Option<&[AttemptRecord]> {
        match self {
            RunValue::Results(records) => Some(records),
            RunValue::Override(_) => None,
        }
    }

    pub fn as_override(&self) -> Option<&Value> {
        match self {
            RunValue::Results(_) => None,
            RunValue::Override(value) => Some(value),
        }
    }
}

/// Outcome of one `run()` invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Rejected before anything executed; the result log is unmodified.
    Rejected(Rejection),

    /// The cascade ran to completion. `success` mirrors only the final
    /// attempt; inspect the result log for the full history.
    Finished { success: bool, value: RunValue },
}

impl RunOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, RunOutcome::Rejected(_))
    }

    /// Did the cascade end on a successful attempt?
    pub fn succeeded(&self) -> bool {
        matches!(self, RunOutcome::Finished { success: true, .. })
    }

    pub fn value(&self) -> Option<&RunValue> {
        match self {
            RunOutcome::Rejected(_) => None,
            RunOutcome::Finished { value, .. } => Some(value),
        }
    }
}
