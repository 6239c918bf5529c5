//! Task status for the orchestrator state machine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Task status.
///
/// State transitions:
/// - Idle -> Running -> Finished
/// - Finished -> Running (a later `run()` re-enters the cycle)
///
/// `Paused` is a reserved name: no transition produces it and no
/// pause/resume API exists. It stays declared so the status vocabulary is
/// stable for embedders that persist it.
///
/// Design note: Using an enum ensures exhaustive matching and prevents
/// invalid states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Never run since creation or last reset.
    Idle,

    /// A `run()` is in flight; further `run()` calls are rejected.
    Running,

    /// Reserved, currently unreachable.
    Paused,

    /// The last `run()` completed its cascade.
    Finished,
}

impl TaskStatus {
    /// Is a run in flight right now?
    pub fn is_running(self) -> bool {
        matches!(self, TaskStatus::Running)
    }

    /// May a new run start from this status?
    pub fn can_start(self) -> bool {
        !self.is_running()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Idle => "idle",
            TaskStatus::Running => "running",
            TaskStatus::Paused => "paused",
            TaskStatus::Finished => "finished",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::idle(TaskStatus::Idle, true)]
    #[case::running(TaskStatus::Running, false)]
    #[case::paused(TaskStatus::Paused, true)]
    #[case::finished(TaskStatus::Finished, true)]
    fn only_running_blocks_a_new_run(#[case] status: TaskStatus, #[case] can_start: bool) {
        assert_eq!(status.can_start(), can_start);
    }

    #[test]
    fn serializes_snake_case() {
        let s = serde_json::to_string(&TaskStatus::Finished).unwrap();
        assert_eq!(s, "\"finished\"");
    }
}
