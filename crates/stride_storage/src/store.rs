#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{debug, warn};

use stride_kernel_contracts::account::AccountProfile;
use stride_kernel_contracts::activity::{ActivityCategory, ActivityId, ActivityRecord};
use stride_kernel_contracts::competition::{Competition, CompetitionId};
use stride_kernel_contracts::enrollment::Enrollment;
use stride_kernel_contracts::journal::{
    JournalEntry, JournalEntryId, JournalEntryInput, JOURNAL_GENESIS_HASH,
};
use stride_kernel_contracts::{ClockValue, ContractViolation, Principal, Validate};

use crate::sequence::SequenceCounter;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StorageError {
    #[error("foreign key violation on {table}: {key}")]
    ForeignKeyViolation { table: &'static str, key: String },
    #[error("duplicate key on {table}: {key}")]
    DuplicateKey { table: &'static str, key: String },
    #[error("append-only violation on {table}")]
    AppendOnlyViolation { table: &'static str },
    #[error("journal hash chain broken at entry {entry_id}")]
    JournalChainBroken { entry_id: u64 },
    #[error("failed to encode {table} row: {reason}")]
    Encoding { table: &'static str, reason: String },
    #[error(transparent)]
    ContractViolation(#[from] ContractViolation),
}

/// Content hash of one journal entry, chained onto `prev_hash`.
pub fn journal_entry_hash_hex(
    entry_id: JournalEntryId,
    input: &JournalEntryInput,
    prev_hash: &str,
) -> Result<String, StorageError> {
    let body = serde_json::to_vec(&(
        entry_id,
        &input.caller,
        input.clock,
        &input.operation,
        input.outcome,
    ))
    .map_err(|e| StorageError::Encoding {
        table: "journal",
        reason: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update([0u8]);
    hasher.update(&body);
    Ok(hex::encode(hasher.finalize()))
}

/// In-memory ledger tables.
///
/// Every `append_*`/`insert_*` either fails before touching any table or fully
/// applies. Sequence counters advance only when the row they number is written.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    accounts: BTreeMap<Principal, AccountProfile>,

    activities: BTreeMap<(ActivityId, Principal), ActivityRecord>,
    // Secondary index for per-owner scans: (owner, activity_id).
    activities_by_owner: BTreeSet<(Principal, ActivityId)>,
    activity_seq: SequenceCounter,

    competitions: BTreeMap<CompetitionId, Competition>,
    competition_seq: SequenceCounter,

    enrollments: BTreeMap<(CompetitionId, Principal), Enrollment>,

    activity_types: BTreeSet<ActivityCategory>,

    journal: Vec<JournalEntry>,
    next_journal_entry_id: u64,

    last_committed_clock: Option<ClockValue>,
}

impl Default for LedgerStore {
    fn default() -> Self {
        Self::new_in_memory()
    }
}

impl LedgerStore {
    pub fn new_in_memory() -> Self {
        Self {
            accounts: BTreeMap::new(),
            activities: BTreeMap::new(),
            activities_by_owner: BTreeSet::new(),
            activity_seq: SequenceCounter::new(),
            competitions: BTreeMap::new(),
            competition_seq: SequenceCounter::new(),
            enrollments: BTreeMap::new(),
            activity_types: BTreeSet::new(),
            journal: Vec::new(),
            next_journal_entry_id: 1,
            last_committed_clock: None,
        }
    }

    // ------------------------
    // Accounts.
    // ------------------------

    pub fn insert_account(&mut self, record: AccountProfile) -> Result<(), StorageError> {
        record.validate()?;
        if self.accounts.contains_key(&record.principal) {
            return Err(StorageError::DuplicateKey {
                table: "accounts",
                key: record.principal.as_str().to_string(),
            });
        }
        self.accounts.insert(record.principal.clone(), record);
        Ok(())
    }

    /// Creates or replaces the profile for `record.principal`.
    pub fn upsert_account(&mut self, record: AccountProfile) -> Result<(), StorageError> {
        record.validate()?;
        self.accounts.insert(record.principal.clone(), record);
        Ok(())
    }

    pub fn get_account(&self, principal: &Principal) -> Option<&AccountProfile> {
        self.accounts.get(principal)
    }

    pub fn account_rows(&self) -> &BTreeMap<Principal, AccountProfile> {
        &self.accounts
    }

    /// Bumps the owner's aggregate. Returns `false` when the owner has no profile, in
    /// which case nothing is written.
    pub fn record_account_activity(&mut self, owner: &Principal, at: ClockValue) -> bool {
        match self.accounts.get_mut(owner) {
            Some(profile) => {
                profile.record_activity(at);
                true
            }
            None => {
                debug!(owner = %owner, "no profile for activity owner; aggregate skipped");
                false
            }
        }
    }

    // ------------------------
    // Activity ledger (append-only).
    // ------------------------

    pub fn next_activity_id(&self) -> ActivityId {
        ActivityId(self.activity_seq.peek_next())
    }

    pub fn last_activity_id(&self) -> u64 {
        self.activity_seq.current()
    }

    pub fn append_activity_row(&mut self, record: ActivityRecord) -> Result<ActivityId, StorageError> {
        record.validate()?;
        if record.activity_id != self.next_activity_id() {
            return Err(StorageError::ContractViolation(ContractViolation::InvalidValue {
                field: "activity_record.activity_id",
                reason: "must be the next allocated activity id",
            }));
        }
        let key = (record.activity_id, record.owner.clone());
        if self.activities.contains_key(&key) {
            return Err(StorageError::DuplicateKey {
                table: "activities",
                key: record.activity_id.0.to_string(),
            });
        }
        let id = record.activity_id;
        self.activities_by_owner.insert((record.owner.clone(), id));
        self.activities.insert(key, record);
        self.activity_seq.commit(id.0);
        Ok(id)
    }

    pub fn get_activity(&self, activity_id: ActivityId, owner: &Principal) -> Option<&ActivityRecord> {
        self.activities.get(&(activity_id, owner.clone()))
    }

    pub fn activity_rows(&self) -> &BTreeMap<(ActivityId, Principal), ActivityRecord> {
        &self.activities
    }

    /// Activities owned by `owner`, ascending by id.
    pub fn activities_for_owner(&self, owner: &Principal) -> Vec<&ActivityRecord> {
        self.activities_by_owner
            .range((owner.clone(), ActivityId(0))..=(owner.clone(), ActivityId(u64::MAX)))
            .filter_map(|(o, id)| self.activities.get(&(*id, o.clone())))
            .collect()
    }

    pub fn owner_has_category_in_day(
        &self,
        owner: &Principal,
        category: &ActivityCategory,
        at: ClockValue,
        clock_units_per_day: u64,
    ) -> bool {
        let day = at.day_bucket(clock_units_per_day);
        self.activities_for_owner(owner).into_iter().any(|r| {
            &r.category == category && r.block_timestamp.day_bucket(clock_units_per_day) == day
        })
    }

    pub fn attempt_overwrite_activity_row(
        &mut self,
        activity_id: ActivityId,
        _owner: &Principal,
    ) -> Result<(), StorageError> {
        warn!(activity_id = activity_id.0, "rejected overwrite of activity row");
        Err(StorageError::AppendOnlyViolation {
            table: "activities",
        })
    }

    // ------------------------
    // Competition registry.
    // ------------------------

    pub fn next_competition_id(&self) -> CompetitionId {
        CompetitionId(self.competition_seq.peek_next())
    }

    pub fn last_competition_id(&self) -> u64 {
        self.competition_seq.current()
    }

    pub fn append_competition_row(
        &mut self,
        record: Competition,
    ) -> Result<CompetitionId, StorageError> {
        record.validate()?;
        if self.competitions.contains_key(&record.competition_id) {
            return Err(StorageError::DuplicateKey {
                table: "competitions",
                key: record.competition_id.0.to_string(),
            });
        }
        if record.competition_id != self.next_competition_id() {
            return Err(StorageError::ContractViolation(ContractViolation::InvalidValue {
                field: "competition.competition_id",
                reason: "must be the next allocated competition id",
            }));
        }
        let id = record.competition_id;
        self.competitions.insert(id, record);
        self.competition_seq.commit(id.0);
        Ok(id)
    }

    pub fn get_competition(&self, competition_id: CompetitionId) -> Option<&Competition> {
        self.competitions.get(&competition_id)
    }

    pub fn competition_rows(&self) -> &BTreeMap<CompetitionId, Competition> {
        &self.competitions
    }

    pub fn set_competition_operational(
        &mut self,
        competition_id: CompetitionId,
        is_operational: bool,
    ) -> Result<(), StorageError> {
        let Some(c) = self.competitions.get_mut(&competition_id) else {
            return Err(StorageError::ForeignKeyViolation {
                table: "competitions",
                key: competition_id.0.to_string(),
            });
        };
        c.is_operational = is_operational;
        Ok(())
    }

    // ------------------------
    // Enrollment table.
    // ------------------------

    fn check_enrollment_fk(&self, record: &Enrollment) -> Result<(), StorageError> {
        if !self.competitions.contains_key(&record.competition_id) {
            return Err(StorageError::ForeignKeyViolation {
                table: "enrollments.competition_id",
                key: record.competition_id.0.to_string(),
            });
        }
        Ok(())
    }

    pub fn insert_enrollment(&mut self, record: Enrollment) -> Result<(), StorageError> {
        record.validate()?;
        self.check_enrollment_fk(&record)?;
        let key = (record.competition_id, record.participant.clone());
        if self.enrollments.contains_key(&key) {
            return Err(StorageError::DuplicateKey {
                table: "enrollments",
                key: format!("{}:{}", record.competition_id.0, record.participant),
            });
        }
        self.enrollments.insert(key, record);
        Ok(())
    }

    /// Creates or replaces the enrollment, resetting any recorded progress.
    pub fn upsert_enrollment(&mut self, record: Enrollment) -> Result<(), StorageError> {
        record.validate()?;
        self.check_enrollment_fk(&record)?;
        self.enrollments
            .insert((record.competition_id, record.participant.clone()), record);
        Ok(())
    }

    pub fn get_enrollment(
        &self,
        competition_id: CompetitionId,
        participant: &Principal,
    ) -> Option<&Enrollment> {
        self.enrollments.get(&(competition_id, participant.clone()))
    }

    pub fn enrollment_rows(&self) -> &BTreeMap<(CompetitionId, Principal), Enrollment> {
        &self.enrollments
    }

    pub fn enrollments_for_competition(&self, competition_id: CompetitionId) -> Vec<&Enrollment> {
        self.enrollments
            .iter()
            .filter(|((cid, _), _)| *cid == competition_id)
            .map(|(_, e)| e)
            .collect()
    }

    // ------------------------
    // Registered activity categories.
    // ------------------------

    /// Returns `true` if the category was not registered before.
    pub fn insert_activity_type(&mut self, category: ActivityCategory) -> Result<bool, StorageError> {
        category.validate()?;
        Ok(self.activity_types.insert(category))
    }

    pub fn has_activity_type(&self, category: &ActivityCategory) -> bool {
        self.activity_types.contains(category)
    }

    pub fn activity_type_rows(&self) -> &BTreeSet<ActivityCategory> {
        &self.activity_types
    }

    // ------------------------
    // Operation journal (append-only, hash-chained).
    // ------------------------

    fn journal_head_hash(&self) -> &str {
        self.journal
            .last()
            .map(|e| e.entry_hash.as_str())
            .unwrap_or(JOURNAL_GENESIS_HASH)
    }

    /// Builds the next journal entry without writing it.
    pub fn stage_journal_entry(&self, input: JournalEntryInput) -> Result<JournalEntry, StorageError> {
        input.validate()?;
        let entry_id = JournalEntryId(self.next_journal_entry_id);
        let prev_hash = self.journal_head_hash().to_string();
        let entry_hash = journal_entry_hash_hex(entry_id, &input, &prev_hash)?;
        Ok(JournalEntry::from_input_v1(
            entry_id, input, prev_hash, entry_hash,
        )?)
    }

    /// Appends an entry produced by `stage_journal_entry` against the current head.
    pub fn commit_journal_entry(&mut self, entry: JournalEntry) -> Result<JournalEntryId, StorageError> {
        if entry.entry_id.0 != self.next_journal_entry_id {
            return Err(StorageError::DuplicateKey {
                table: "journal",
                key: entry.entry_id.0.to_string(),
            });
        }
        if entry.prev_hash != self.journal_head_hash() {
            return Err(StorageError::JournalChainBroken {
                entry_id: entry.entry_id.0,
            });
        }
        let id = entry.entry_id;
        self.next_journal_entry_id = self.next_journal_entry_id.saturating_add(1);
        self.journal.push(entry);
        Ok(id)
    }

    pub fn append_journal_entry(&mut self, input: JournalEntryInput) -> Result<JournalEntryId, StorageError> {
        let entry = self.stage_journal_entry(input)?;
        self.commit_journal_entry(entry)
    }

    pub fn journal_rows(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn attempt_overwrite_journal_entry(
        &mut self,
        entry_id: JournalEntryId,
    ) -> Result<(), StorageError> {
        warn!(entry_id = entry_id.0, "rejected overwrite of journal entry");
        Err(StorageError::AppendOnlyViolation { table: "journal" })
    }

    /// Recomputes every entry hash from genesis.
    pub fn verify_journal_chain(&self) -> Result<(), StorageError> {
        verify_journal_chain(&self.journal)
    }

    // ------------------------
    // Clock bookkeeping.
    // ------------------------

    pub fn last_committed_clock(&self) -> Option<ClockValue> {
        self.last_committed_clock
    }

    pub fn note_committed_clock(&mut self, clock: ClockValue) {
        self.last_committed_clock = Some(match self.last_committed_clock {
            Some(prev) => prev.max(clock),
            None => clock,
        });
    }
}

pub fn verify_journal_chain(entries: &[JournalEntry]) -> Result<(), StorageError> {
    let mut prev = JOURNAL_GENESIS_HASH.to_string();
    for (i, e) in entries.iter().enumerate() {
        let expected_id = (i as u64).saturating_add(1);
        if e.entry_id.0 != expected_id || e.prev_hash != prev {
            return Err(StorageError::JournalChainBroken {
                entry_id: e.entry_id.0,
            });
        }
        let input = JournalEntryInput {
            caller: e.caller.clone(),
            clock: e.clock,
            operation: e.operation.clone(),
            outcome: e.outcome,
        };
        if journal_entry_hash_hex(e.entry_id, &input, &prev)? != e.entry_hash {
            return Err(StorageError::JournalChainBroken {
                entry_id: e.entry_id.0,
            });
        }
        prev = e.entry_hash.clone();
    }
    Ok(())
}
