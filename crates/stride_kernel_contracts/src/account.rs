#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::common::validate_bounded_text;
use crate::{ClockValue, ContractViolation, Principal, SchemaVersion, Validate};

pub const ACCOUNT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);
pub const DISPLAY_NAME_MAX_UNITS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_bounded_text("display_name", &v, DISPLAY_NAME_MAX_UNITS)?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for DisplayName {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_bounded_text("display_name", &self.0, DISPLAY_NAME_MAX_UNITS)
    }
}

impl TryFrom<String> for DisplayName {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DisplayName> for String {
    fn from(v: DisplayName) -> Self {
        v.0
    }
}

/// Participant profile. `activity_count` tracks the number of activity records owned
/// by `principal` since the profile was (re)created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub schema_version: SchemaVersion,
    pub principal: Principal,
    pub display_name: DisplayName,
    pub enrollment_timestamp: ClockValue,
    pub activity_count: u64,
    pub most_recent_activity: Option<ClockValue>,
}

impl AccountProfile {
    pub fn v1(principal: Principal, display_name: DisplayName, enrollment_timestamp: ClockValue) -> Self {
        Self {
            schema_version: ACCOUNT_CONTRACT_VERSION,
            principal,
            display_name,
            enrollment_timestamp,
            activity_count: 0,
            most_recent_activity: None,
        }
    }

    pub fn record_activity(&mut self, at: ClockValue) {
        self.activity_count = self.activity_count.saturating_add(1);
        self.most_recent_activity = Some(at);
    }
}

impl Validate for AccountProfile {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ACCOUNT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "account_profile.schema_version",
                reason: "must match ACCOUNT_CONTRACT_VERSION",
            });
        }
        self.principal.validate()?;
        self.display_name.validate()?;
        if (self.activity_count == 0) != self.most_recent_activity.is_none() {
            return Err(ContractViolation::InvalidValue {
                field: "account_profile.most_recent_activity",
                reason: "must be present iff activity_count > 0",
            });
        }
        Ok(())
    }
}
