#![forbid(unsafe_code)]

use thiserror::Error;

use crate::{ContractViolation, ReasonCodeId};

pub mod reason_codes {
    use crate::ReasonCodeId;

    // Stable wire codes. Callers distinguish refusals by these values only.
    pub const UNAUTHORIZED: ReasonCodeId = ReasonCodeId(100);
    pub const ACCOUNT_EXISTS: ReasonCodeId = ReasonCodeId(101);
    pub const ACCOUNT_MISSING: ReasonCodeId = ReasonCodeId(102);
    pub const COMPETITION_MISSING: ReasonCodeId = ReasonCodeId(103);
    pub const ALREADY_ENROLLED: ReasonCodeId = ReasonCodeId(104);
    pub const COMPETITION_CONCLUDED: ReasonCodeId = ReasonCodeId(105);
    pub const COMPETITION_INACTIVE: ReasonCodeId = ReasonCodeId(106);
    pub const INVALID_ACTIVITY_TYPE: ReasonCodeId = ReasonCodeId(107);
    pub const DUPLICATE_DAILY_ENTRY: ReasonCodeId = ReasonCodeId(108);
    pub const INVALID_PARAMETERS: ReasonCodeId = ReasonCodeId(109);
    pub const NOT_ORGANIZER: ReasonCodeId = ReasonCodeId(110);
    pub const COMPETITION_EXISTS: ReasonCodeId = ReasonCodeId(111);
}

/// Tagged refusal returned by a mutating operation. A refusal always means the
/// operation left no trace in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerRefusal {
    #[error("caller is not authorized for this operation")]
    Unauthorized,
    #[error("account already exists")]
    AccountExists,
    #[error("account does not exist")]
    AccountMissing,
    #[error("competition does not exist")]
    CompetitionMissing,
    #[error("caller is already enrolled")]
    AlreadyEnrolled,
    #[error("competition has concluded")]
    CompetitionConcluded,
    #[error("competition is not accepting enrollments")]
    CompetitionInactive,
    #[error("activity category is not registered")]
    InvalidActivityType,
    #[error("activity of this category already recorded today")]
    DuplicateDailyEntry,
    #[error("invalid parameters: {field}: {reason}")]
    InvalidParameters {
        field: &'static str,
        reason: &'static str,
    },
    #[error("caller is not the competition organizer")]
    NotOrganizer,
    #[error("competition already exists")]
    CompetitionExists,
}

impl LedgerRefusal {
    pub fn reason_code(&self) -> ReasonCodeId {
        use reason_codes::*;
        match self {
            LedgerRefusal::Unauthorized => UNAUTHORIZED,
            LedgerRefusal::AccountExists => ACCOUNT_EXISTS,
            LedgerRefusal::AccountMissing => ACCOUNT_MISSING,
            LedgerRefusal::CompetitionMissing => COMPETITION_MISSING,
            LedgerRefusal::AlreadyEnrolled => ALREADY_ENROLLED,
            LedgerRefusal::CompetitionConcluded => COMPETITION_CONCLUDED,
            LedgerRefusal::CompetitionInactive => COMPETITION_INACTIVE,
            LedgerRefusal::InvalidActivityType => INVALID_ACTIVITY_TYPE,
            LedgerRefusal::DuplicateDailyEntry => DUPLICATE_DAILY_ENTRY,
            LedgerRefusal::InvalidParameters { .. } => INVALID_PARAMETERS,
            LedgerRefusal::NotOrganizer => NOT_ORGANIZER,
            LedgerRefusal::CompetitionExists => COMPETITION_EXISTS,
        }
    }

    pub fn invalid_parameters(field: &'static str, reason: &'static str) -> Self {
        LedgerRefusal::InvalidParameters { field, reason }
    }
}

impl From<ContractViolation> for LedgerRefusal {
    fn from(v: ContractViolation) -> Self {
        match v {
            ContractViolation::InvalidValue { field, reason } => {
                LedgerRefusal::InvalidParameters { field, reason }
            }
            ContractViolation::InvalidRange { field, .. } => LedgerRefusal::InvalidParameters {
                field,
                reason: "out of range",
            },
        }
    }
}
