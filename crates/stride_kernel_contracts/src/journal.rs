#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::account::DisplayName;
use crate::activity::{ActivityCategory, ActivityId, ActivitySubmission};
use crate::competition::{CompetitionId, CompetitionLaunch};
use crate::{ClockValue, ContractViolation, Principal, SchemaVersion, Validate};

pub const JOURNAL_CONTRACT_VERSION: SchemaVersion = SchemaVersion(1);

/// `prev_hash` of the first journal entry.
pub const JOURNAL_GENESIS_HASH: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalEntryId(pub u64);

impl Validate for JournalEntryId {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.0 == 0 {
            return Err(ContractViolation::InvalidValue {
                field: "journal_entry_id",
                reason: "must be > 0",
            });
        }
        Ok(())
    }
}

/// A committed mutating call, as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum LedgerOperation {
    SetupAccount { display_name: DisplayName },
    SubmitActivity { submission: ActivitySubmission },
    LaunchCompetition { launch: CompetitionLaunch },
    EnrollInCompetition { competition_id: CompetitionId },
    RegisterActivityType { category: ActivityCategory },
    DeactivateCompetition { competition_id: CompetitionId },
}

impl LedgerOperation {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerOperation::SetupAccount { .. } => "setup-account",
            LedgerOperation::SubmitActivity { .. } => "submit-activity",
            LedgerOperation::LaunchCompetition { .. } => "launch-competition",
            LedgerOperation::EnrollInCompetition { .. } => "enroll-in-competition",
            LedgerOperation::RegisterActivityType { .. } => "register-activity-type",
            LedgerOperation::DeactivateCompetition { .. } => "deactivate-competition",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum OperationOutcome {
    Ok,
    Activity(ActivityId),
    Competition(CompetitionId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntryInput {
    pub caller: Principal,
    pub clock: ClockValue,
    pub operation: LedgerOperation,
    pub outcome: OperationOutcome,
}

impl JournalEntryInput {
    pub fn v1(
        caller: Principal,
        clock: ClockValue,
        operation: LedgerOperation,
        outcome: OperationOutcome,
    ) -> Result<Self, ContractViolation> {
        let r = Self {
            caller,
            clock,
            operation,
            outcome,
        };
        r.validate()?;
        Ok(r)
    }
}

impl Validate for JournalEntryInput {
    fn validate(&self) -> Result<(), ContractViolation> {
        self.caller.validate()?;
        match (&self.operation, self.outcome) {
            (LedgerOperation::SubmitActivity { .. }, OperationOutcome::Activity(id)) => id.validate(),
            (LedgerOperation::LaunchCompetition { .. }, OperationOutcome::Competition(id)) => {
                id.validate()
            }
            (
                LedgerOperation::SubmitActivity { .. } | LedgerOperation::LaunchCompetition { .. },
                _,
            ) => Err(ContractViolation::InvalidValue {
                field: "journal_entry_input.outcome",
                reason: "must carry the allocated id",
            }),
            (_, OperationOutcome::Ok) => Ok(()),
            (_, _) => Err(ContractViolation::InvalidValue {
                field: "journal_entry_input.outcome",
                reason: "must be Ok for operations that allocate nothing",
            }),
        }
    }
}

/// Append-only, hash-chained record of one committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub schema_version: SchemaVersion,
    pub entry_id: JournalEntryId,
    pub caller: Principal,
    pub clock: ClockValue,
    pub operation: LedgerOperation,
    pub outcome: OperationOutcome,
    pub prev_hash: String,
    pub entry_hash: String,
}

impl JournalEntry {
    pub fn from_input_v1(
        entry_id: JournalEntryId,
        input: JournalEntryInput,
        prev_hash: String,
        entry_hash: String,
    ) -> Result<Self, ContractViolation> {
        input.validate()?;
        let r = Self {
            schema_version: JOURNAL_CONTRACT_VERSION,
            entry_id,
            caller: input.caller,
            clock: input.clock,
            operation: input.operation,
            outcome: input.outcome,
            prev_hash,
            entry_hash,
        };
        r.validate()?;
        Ok(r)
    }
}

fn validate_hash_hex(field: &'static str, v: &str) -> Result<(), ContractViolation> {
    if v.len() != 64 || !v.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)) {
        return Err(ContractViolation::InvalidValue {
            field,
            reason: "must be 64 lowercase hex chars",
        });
    }
    Ok(())
}

impl Validate for JournalEntry {
    fn validate(&self) -> Result<(), ContractViolation> {
        if self.schema_version != JOURNAL_CONTRACT_VERSION {
            return Err(ContractViolation::InvalidValue {
                field: "journal_entry.schema_version",
                reason: "must match JOURNAL_CONTRACT_VERSION",
            });
        }
        self.entry_id.validate()?;
        validate_hash_hex("journal_entry.prev_hash", &self.prev_hash)?;
        validate_hash_hex("journal_entry.entry_hash", &self.entry_hash)?;
        JournalEntryInput {
            caller: self.caller.clone(),
            clock: self.clock,
            operation: self.operation.clone(),
            outcome: self.outcome,
        }
        .validate()
    }
}
