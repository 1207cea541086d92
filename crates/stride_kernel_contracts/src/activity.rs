#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::common::{validate_bounded_text, validate_positive};
use crate::{ClockValue, ContractViolation, Principal, SchemaVersion, Validate};

pub const ACTIVITY_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);
pub const ACTIVITY_CATEGORY_MAX_UNITS: usize = 20;
pub const ACTIVITY_NOTES_MAX_UNITS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityId(pub u64);

impl Validate for ActivityId {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_positive("activity_id", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivityCategory(String);

impl ActivityCategory {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_bounded_text("activity_category", &v, ACTIVITY_CATEGORY_MAX_UNITS)?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for ActivityCategory {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_bounded_text("activity_category", &self.0, ACTIVITY_CATEGORY_MAX_UNITS)
    }
}

impl TryFrom<String> for ActivityCategory {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActivityCategory> for String {
    fn from(v: ActivityCategory) -> Self {
        v.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ActivityNotes(String);

impl ActivityNotes {
    pub fn new(v: impl Into<String>) -> Result<Self, ContractViolation> {
        let v = v.into();
        validate_bounded_text("activity_notes", &v, ACTIVITY_NOTES_MAX_UNITS)?;
        Ok(Self(v))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Validate for ActivityNotes {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_bounded_text("activity_notes", &self.0, ACTIVITY_NOTES_MAX_UNITS)
    }
}

impl TryFrom<String> for ActivityNotes {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ActivityNotes> for String {
    fn from(v: ActivityNotes) -> Self {
        v.0
    }
}

/// Caller-supplied arguments of `submit-activity`.
///
/// Construction only bounds the text fields. The `duration_minutes > 0` rule is a
/// precondition of the operation and is checked by the validation layer, so a
/// zero-duration submission can still reach the ledger and be refused there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivitySubmission {
    pub schema_version: SchemaVersion,
    pub category: ActivityCategory,
    pub duration_minutes: u64,
    pub energy_expenditure: u64,
    pub notes: Option<ActivityNotes>,
}

impl ActivitySubmission {
    pub fn v1(
        category: ActivityCategory,
        duration_minutes: u64,
        energy_expenditure: u64,
        notes: Option<ActivityNotes>,
    ) -> Self {
        Self {
            schema_version: ACTIVITY_CONTRACT_VERSION,
            category,
            duration_minutes,
            energy_expenditure,
            notes,
        }
    }
}

impl Validate for ActivitySubmission {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ACTIVITY_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "activity_submission.schema_version",
                reason: "must match ACTIVITY_CONTRACT_VERSION",
            });
        }
        validate_positive(
            "activity_submission.duration_minutes",
            self.duration_minutes,
        )?;
        self.category.validate()?;
        if let Some(n) = &self.notes {
            n.validate()?;
        }
        Ok(())
    }
}

/// Immutable activity session, keyed by `(activity_id, owner)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub schema_version: SchemaVersion,
    pub activity_id: ActivityId,
    pub owner: Principal,
    pub category: ActivityCategory,
    pub duration_minutes: u64,
    pub energy_expenditure: u64,
    pub block_timestamp: ClockValue,
    pub notes: Option<ActivityNotes>,
}

impl ActivityRecord {
    pub fn from_submission_v1(
        activity_id: ActivityId,
        owner: Principal,
        block_timestamp: ClockValue,
        submission: ActivitySubmission,
    ) -> Result<Self, ContractViolation> {
        submission.validate()?;
        let r = Self {
            schema_version: ACTIVITY_CONTRACT_VERSION,
            activity_id,
            owner,
            category: submission.category,
            duration_minutes: submission.duration_minutes,
            energy_expenditure: submission.energy_expenditure,
            block_timestamp,
            notes: submission.notes,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for ActivityRecord {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ACTIVITY_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "activity_record.schema_version",
                reason: "must match ACTIVITY_CONTRACT_VERSION",
            });
        }
        self.activity_id.validate()?;
        self.owner.validate()?;
        self.category.validate()?;
        validate_positive("activity_record.duration_minutes", self.duration_minutes)?;
        if let Some(n) = &self.notes {
            n.validate()?;
        }
        Ok(())
    }
}
