#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchemaVersion(pub u32);

/// Logical clock value supplied by the external ordering service on every call.
///
/// Only monotonicity is assumed; the ledger never reads wall-clock time and never
/// advances this value itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClockValue(pub u64);

impl ClockValue {
    /// Day bucket of this clock value for a given cadence (units per day).
    pub fn day_bucket(self, units_per_day: u64) -> u64 {
        self.0 / units_per_day.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReasonCodeId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    #[error("invalid value for {field}: {reason}")]
    InvalidValue {
        field: &'static str,
        reason: &'static str,
    },
    #[error("{field} must be within {min}..={max}, got {got}")]
    InvalidRange {
        field: &'static str,
        min: u64,
        max: u64,
        got: u64,
    },
}

pub trait Validate {
    fn validate(&self) -> Result<(), ContractViolation>;
}

/// Bounded text is measured in Unicode scalar values, not bytes.
pub(crate) fn validate_bounded_text(
    field: &'static str,
    value: &str,
    max_units: usize,
) -> Result<(), ContractViolation> {
    if value.chars().count() > max_units {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "exceeds max length",
        });
    }
    Ok(())
}

pub(crate) fn validate_positive(field: &'static str, value: u64) -> Result<(), ContractViolation> {
    if value == 0 {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be > 0",
        });
    }
    Ok(())
}
