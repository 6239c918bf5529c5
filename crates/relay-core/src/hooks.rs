//! Lifecycle hooks: a closed set of dispatch points with single-slot,
//! last-write-wins callback storage.
//!
//! A hook can observe the task, gate a run (`beforeRun`), or override the
//! final value (`afterRun`). The point set is fixed at compile time; this
//! is intentionally NOT a multi-subscriber event bus, and re-registering a
//! point silently replaces the previous callback.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::RelayError;
use crate::task::Task;

/// The fixed set of lifecycle dispatch points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPoint {
    /// About to create a driver (fires on actual creation only, never on
    /// lookup of an existing one).
    BeforeCreateDriver,
    AfterCreateDriver,

    /// Construction-time setup finished; fires exactly once per task.
    Ready,

    /// About to start a run; the reply gates it.
    BeforeRun,

    /// About to execute a driver attempt; `current_driver()` is already
    /// pointing at it.
    BeforeRunDriver,
    AfterRunDriver,

    /// Run finished; a non-null, non-boolean reply value replaces the raw
    /// results as `run()`'s return value.
    AfterRun,
}

impl HookPoint {
    pub const ALL: [HookPoint; 7] = [
        HookPoint::BeforeCreateDriver,
        HookPoint::AfterCreateDriver,
        HookPoint::Ready,
        HookPoint::BeforeRun,
        HookPoint::BeforeRunDriver,
        HookPoint::AfterRunDriver,
        HookPoint::AfterRun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HookPoint::BeforeCreateDriver => "beforeCreateDriver",
            HookPoint::AfterCreateDriver => "afterCreateDriver",
            HookPoint::Ready => "ready",
            HookPoint::BeforeRun => "beforeRun",
            HookPoint::BeforeRunDriver => "beforeRunDriver",
            HookPoint::AfterRunDriver => "afterRunDriver",
            HookPoint::AfterRun => "afterRun",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HookPoint {
    type Err = RelayError;

    /// Boundary parser for configuration/CLI input. Unknown identifiers are
    /// a configuration error; inside the crate the enum makes them
    /// unrepresentable.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HookPoint::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RelayError::Configuration(format!("unsupported hook '{s}'")))
    }
}

/// Callback errors are arbitrary; the registry wraps them in
/// `RelayError::Hook` and lets them surface to `run()`'s caller.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Result a callback produces: `Ok(None)` means "abstain / pass".
pub type HookResult = Result<Option<Value>, HookError>;

type HookFn = Box<dyn Fn(&Task, Option<&Value>) -> HookResult + Send + Sync>;

/// Single-slot callback storage keyed by hook point.
#[derive(Default)]
pub struct HookRegistry {
    slots: HashMap<HookPoint, HookFn>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Last write wins; the previous callback for the
    /// same point is dropped silently.
    pub fn set<F>(&mut self, point: HookPoint, handler: F)
    where
        F: Fn(&Task, Option<&Value>) -> HookResult + Send + Sync + 'static,
    {
        self.slots.insert(point, Box::new(handler));
    }

    pub fn contains(&self, point: HookPoint) -> bool {
        self.slots.contains_key(&point)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Invoke the callback for `point`, if any.
    ///
    /// No callback, or a callback answering `None`/`null`, is a pass. Any
    /// other value is handed back verbatim for the caller to interpret
    /// (gate, override, or ignore). Callback failures are wrapped and
    /// propagated; there is no suppression or retry here.
    pub(crate) fn dispatch(
        &self,
        point: HookPoint,
        task: &Task,
        data: Option<&Value>,
    ) -> Result<HookReply, RelayError> {
        let Some(handler) = self.slots.get(&point) else {
            return Ok(HookReply::Pass);
        };
        match handler(task, data) {
            Ok(None) | Ok(Some(Value::Null)) => Ok(HookReply::Pass),
            Ok(Some(value)) => Ok(HookReply::Value(value)),
            Err(source) => Err(RelayError::Hook { point, source }),
        }
    }
}

impl fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut points: Vec<&'static str> = self.slots.keys().map(|p| p.as_str()).collect();
        points.sort_unstable();
        f.debug_struct("HookRegistry").field("points", &points).finish()
    }
}

/// What a dispatch produced.
#[derive(Debug, Clone, PartialEq)]
pub enum HookReply {
    /// No callback registered, or the callback abstained.
    Pass,

    /// The callback's verbatim (non-null) value.
    Value(Value),
}

impl HookReply {
    /// Gate interpretation (used by `beforeRun`): abstaining allows; a
    /// falsy value (false, 0, empty string, empty array) denies.
    pub fn allows(&self) -> bool {
        match self {
            HookReply::Pass => true,
            HookReply::Value(value) => match value {
                Value::Null => true,
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
                Value::String(s) => !s.is_empty(),
                Value::Array(a) => !a.is_empty(),
                Value::Object(_) => true,
            },
        }
    }

    /// Override interpretation (used by `afterRun`): any non-null,
    /// non-boolean value replaces the raw results.
    pub fn override_value(self) -> Option<Value> {
        match self {
            HookReply::Pass => None,
            HookReply::Value(Value::Bool(_)) => None,
            HookReply::Value(value) => Some(value),
        }
    }
}
