#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stride_kernel_contracts::activity::ActivityCategory;
use stride_kernel_contracts::{ContractViolation, Principal, Validate};

/// Which set of preconditions the ledger enforces.
///
/// `LegacyCompatible` reproduces the historical behavior: the account-exists,
/// account-missing, competition-missing, already-enrolled, competition-concluded,
/// invalid-activity-type, duplicate-daily-entry and not-organizer checks are never
/// raised, and activity-type registration is unreachable. `Strict` enforces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationProfile {
    #[default]
    LegacyCompatible,
    Strict,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config rejected: {0}")]
    Invalid(#[from] ContractViolation),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerWiringConfig {
    pub validation_profile: ValidationProfile,
    /// Stored administrator identity; only consulted by the `Strict` profile.
    pub administrator: Option<Principal>,
    pub seed_activity_types: Vec<ActivityCategory>,
    pub clock_units_per_day: u64,
    pub enforce_clock_monotonicity: bool,
}

impl LedgerWiringConfig {
    // One day of ten-minute blocks.
    pub const DEFAULT_CLOCK_UNITS_PER_DAY: u64 = 144;

    pub fn mvp_v1(validation_profile: ValidationProfile) -> Self {
        Self {
            validation_profile,
            administrator: None,
            seed_activity_types: Vec::new(),
            clock_units_per_day: Self::DEFAULT_CLOCK_UNITS_PER_DAY,
            enforce_clock_monotonicity: true,
        }
    }

    pub fn strict_v1(
        administrator: Option<Principal>,
        seed_activity_types: Vec<ActivityCategory>,
    ) -> Self {
        Self {
            administrator,
            seed_activity_types,
            ..Self::mvp_v1(ValidationProfile::Strict)
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn is_strict(&self) -> bool {
        self.validation_profile == ValidationProfile::Strict
    }
}

impl Default for LedgerWiringConfig {
    fn default() -> Self {
        Self::mvp_v1(ValidationProfile::LegacyCompatible)
    }
}

impl Validate for LedgerWiringConfig {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.clock_units_per_day == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "ledger_wiring_config.clock_units_per_day",
                reason: "must be > 0",
            });
        }
        if let Some(admin) = &self.administrator {
            admin.validate()?;
        }
        for c in &self.seed_activity_types {
            c.validate()?;
        }
        Ok(())
    }
}
