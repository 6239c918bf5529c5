use thiserror::Error;

use crate::hooks::HookPoint;

/// Error type for relay-core.
///
/// Driver-level failure (a driver reporting `success == false`) is NOT an
/// error: the failover cascade consumes it. These variants cover misuse and
/// broken internal assumptions only.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Bad registration input: unknown hook name at the parse boundary,
    /// driver registration without a resolvable name, empty token input.
    #[error("configuration: {0}")]
    Configuration(String),

    /// A run (or a failover step) referenced a driver name that is not in
    /// the task's registry. Fatal for that run.
    #[error("no driver named '{driver}' registered on task '{task}'")]
    MissingDriver { task: String, driver: String },

    /// The weighted draw landed outside every computed span even though the
    /// total weight was positive. Indicates a selection defect; surfaced
    /// loudly, never defaulted.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),

    /// A hook callback failed. Propagated to the caller of `run()` as-is;
    /// the core performs no recovery or retry around hooks.
    #[error("hook '{point}' failed: {source}")]
    Hook {
        point: HookPoint,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
