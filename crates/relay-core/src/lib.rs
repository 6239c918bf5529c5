//! relay-core
//!
//! Core building blocks for the Relay orchestrator: one task, several named
//! and weighted drivers, failover through an ordered backup list, lifecycle
//! hooks around everything.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, status, driver, spec, attempt, outcome）
//! - **hooks**: ライフサイクルフック（closed set + single-slot dispatch）
//! - **backup**: 優先順 backup リストと failover カーソル
//! - **select**: 重み付き driver 選択（crate 内部）
//! - **task**: オーケストレーター本体（state machine + run cascade）
//!
//! # 使用例
//! ```ignore
//! let mut task = Task::new("notify");
//! task.register_driver(DriverSpec::named("primary").weight(8), send_primary)?;
//! task.register_driver(DriverSpec::named("fallback").backup(), send_fallback)?;
//! let outcome = task.run(None)?;
//! ```

pub mod backup;
pub mod domain;
pub mod error;
pub mod hooks;
pub mod task;

mod select;

pub use backup::BackupList;
pub use domain::{
    AttemptCounts, AttemptId, AttemptRecord, Driver, DriverReport, DriverSpec, DriverWork,
    Rejection, ResultLog, RunId, RunOutcome, RunValue, TaskStatus, WorkReport,
};
pub use error::RelayError;
pub use hooks::{HookError, HookPoint, HookRegistry, HookReply, HookResult};
pub use task::{Task, TaskSnapshot};
