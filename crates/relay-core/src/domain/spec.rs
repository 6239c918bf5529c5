//! Input spec for driver registration.
//!
//! Registration is configured through an explicit value with named fields
//! instead of classifying loosely-typed arguments inside the orchestrator.
//! The token parser below is the one boundary where free-form text (e.g.
//! from a config file or CLI) is interpreted; past it, everything is typed.

use crate::error::RelayError;

/// Declarative driver attributes: name, selection weight, backup flag.
///
/// The executable work is supplied separately at registration time, so a
/// spec stays plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSpec {
    pub name: Option<String>,
    pub weight: u32,
    pub is_backup: bool,
}

impl Default for DriverSpec {
    fn default() -> Self {
        Self {
            name: None,
            weight: 1,
            is_backup: false,
        }
    }
}

impl DriverSpec {
    /// Convenience constructor for the common case.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    pub fn backup(mut self) -> Self {
        self.is_backup = true;
        self
    }

    /// Parse a whitespace-separated token string, e.g. `"mysms 80 backup"`.
    ///
    /// Each token is classified independently:
    /// - purely numeric -> weight
    /// - contains "backup" (case-insensitive) -> marks the driver as backup
    /// - anything else -> driver name
    ///
    /// Later tokens of the same kind win. Empty input is a configuration
    /// error; a spec that still lacks a name is rejected at registration.
    pub fn parse(input: &str) -> Result<Self, RelayError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        if tokens.is_empty() {
            return Err(RelayError::Configuration(
                "driver registration needs at least one token".to_string(),
            ));
        }

        let mut spec = Self::default();
        for token in tokens {
            if token.chars().all(|c| c.is_ascii_digit()) {
                spec.weight = token.parse().map_err(|_| {
                    RelayError::Configuration(format!("weight '{token}' is out of range"))
                })?;
            } else if token.to_ascii_lowercase().contains("backup") {
                spec.is_backup = true;
            } else {
                spec.name = Some(token.to_string());
            }
        }
        Ok(spec)
    }
}
