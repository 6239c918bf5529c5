//! Domain identifiers (strongly-typed IDs).
//!
//! ULID ベースの ID + Phantom type パターン。
//! - ULID は timestamp が先頭にあるため生成順でソートできる（attempt の
//!   並び確認がそのまま文字列比較になる）
//! - `Id<T>` の `T` は実行時に存在しないマーカー型で、RunId と AttemptId を
//!   コンパイル時に混同できなくする

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// Marker trait for each ID type; provides the `Display` prefix.
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// Generic ID type. `T` is a zero-sized marker (PhantomData).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// Mint a fresh ID from the current time.
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Marker for one `run()` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Run {}

impl IdMarker for Run {
    fn prefix() -> &'static str {
        "run-"
    }
}

/// Marker for one driver attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attempt {}

impl IdMarker for Attempt {
    fn prefix() -> &'static str {
        "attempt-"
    }
}

/// Identifier of a single `run()` invocation. The result log is append-only
/// across runs, so records carry this to stay attributable.
pub type RunId = Id<Run>;

/// Identifier of a single driver attempt.
pub type AttemptId = Id<Attempt>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types_with_prefixes() {
        let run = RunId::generate();
        let attempt = AttemptId::generate();

        assert!(run.to_string().starts_with("run-"));
        assert!(attempt.to_string().starts_with("attempt-"));

        // The whole point: you can't accidentally mix these types.
        // let _: RunId = attempt; // <- does not compile
    }

    #[test]
    fn ids_sort_by_generation_order() {
        // ULID は時刻ベースなので生成順でソート可能
        let a = AttemptId::generate();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = AttemptId::generate();

        assert!(a < b);
    }

    #[test]
    fn ids_roundtrip_json() {
        let run = RunId::generate();
        let s = serde_json::to_string(&run).unwrap();
        let back: RunId = serde_json::from_str(&s).unwrap();
        assert_eq!(run, back);
    }
}
