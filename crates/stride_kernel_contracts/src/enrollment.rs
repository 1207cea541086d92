#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::competition::CompetitionId;
use crate::{ClockValue, ContractViolation, Principal, SchemaVersion, Validate};

pub const ENROLLMENT_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// Membership of `participant` in `competition_id`.
///
/// `activities_logged` and `has_completed_target` have no writer: submitting
/// activities never touches enrollments, so both read as `0`/`false` for the
/// lifetime of the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    pub schema_version: SchemaVersion,
    pub competition_id: CompetitionId,
    pub participant: Principal,
    pub enrollment_time: ClockValue,
    pub activities_logged: u64,
    pub has_completed_target: bool,
}

impl Enrollment {
    pub fn v1(
        competition_id: CompetitionId,
        participant: Principal,
        enrollment_time: ClockValue,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            schema_version: ENROLLMENT_CONTRACT_VERSION,
            competition_id,
            participant,
            enrollment_time,
            activities_logged: 0,
            has_completed_target: false,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for Enrollment {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != ENROLLMENT_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "enrollment.schema_version",
                reason: "must match ENROLLMENT_CONTRACT_VERSION",
            });
        }
        self.competition_id.validate()?;
        self.participant.validate()
    }
}
