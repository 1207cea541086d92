#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use stride_kernel_contracts::account::AccountProfile;
use stride_kernel_contracts::activity::{ActivityCategory, ActivityId, ActivityRecord};
use stride_kernel_contracts::competition::{Competition, CompetitionId};
use stride_kernel_contracts::enrollment::Enrollment;
use stride_kernel_contracts::journal::{JournalEntry, JournalEntryId, JournalEntryInput};
use stride_kernel_contracts::{ClockValue, Principal};

use crate::store::{LedgerStore, StorageError};

/// Typed repository interface for the account store.
pub trait AccountRepo {
    fn insert_account_row(&mut self, record: AccountProfile) -> Result<(), StorageError>;
    fn upsert_account_row(&mut self, record: AccountProfile) -> Result<(), StorageError>;
    fn account_row(&self, principal: &Principal) -> Option<&AccountProfile>;
    fn account_rows(&self) -> &BTreeMap<Principal, AccountProfile>;
    fn bump_account_activity_row(&mut self, owner: &Principal, at: ClockValue) -> bool;
}

/// Typed repository interface for the append-only activity ledger.
pub trait ActivityLedgerRepo {
    fn next_activity_id(&self) -> ActivityId;
    fn last_activity_id(&self) -> u64;
    fn append_activity_ledger_row(&mut self, record: ActivityRecord) -> Result<ActivityId, StorageError>;
    fn activity_row(&self, activity_id: ActivityId, owner: &Principal) -> Option<&ActivityRecord>;
    fn activity_rows_for_owner(&self, owner: &Principal) -> Vec<&ActivityRecord>;
    fn owner_has_category_in_day(
        &self,
        owner: &Principal,
        category: &ActivityCategory,
        at: ClockValue,
        clock_units_per_day: u64,
    ) -> bool;
}

/// Typed repository interface for the competition registry.
pub trait CompetitionRegistryRepo {
    fn next_competition_id(&self) -> CompetitionId;
    fn last_competition_id(&self) -> u64;
    fn append_competition_row(&mut self, record: Competition) -> Result<CompetitionId, StorageError>;
    fn competition_row(&self, competition_id: CompetitionId) -> Option<&Competition>;
    fn set_competition_operational_row(
        &mut self,
        competition_id: CompetitionId,
        is_operational: bool,
    ) -> Result<(), StorageError>;
}

/// Typed repository interface for competition enrollments.
pub trait EnrollmentRepo {
    fn insert_enrollment_row(&mut self, record: Enrollment) -> Result<(), StorageError>;
    fn upsert_enrollment_row(&mut self, record: Enrollment) -> Result<(), StorageError>;
    fn enrollment_row(&self, competition_id: CompetitionId, participant: &Principal) -> Option<&Enrollment>;
    fn enrollment_rows_for_competition(&self, competition_id: CompetitionId) -> Vec<&Enrollment>;
}

/// Typed repository interface for the registered activity categories.
pub trait ActivityTypeRepo {
    fn insert_activity_type_row(&mut self, category: ActivityCategory) -> Result<bool, StorageError>;
    fn has_activity_type_row(&self, category: &ActivityCategory) -> bool;
    fn activity_type_rows(&self) -> &BTreeSet<ActivityCategory>;
}

/// Typed repository interface for the hash-chained operation journal.
pub trait JournalRepo {
    fn stage_journal_row(&self, input: JournalEntryInput) -> Result<JournalEntry, StorageError>;
    fn commit_journal_row(&mut self, entry: JournalEntry) -> Result<JournalEntryId, StorageError>;
    fn journal_rows(&self) -> &[JournalEntry];
    fn verify_journal_rows(&self) -> Result<(), StorageError>;
    fn last_committed_clock(&self) -> Option<ClockValue>;
    fn note_committed_clock(&mut self, clock: ClockValue);
}

/// Everything the ledger engine needs from storage.
pub trait LedgerRepo:
    AccountRepo + ActivityLedgerRepo + CompetitionRegistryRepo + EnrollmentRepo + ActivityTypeRepo + JournalRepo
{
}

impl<T> LedgerRepo for T where
    T: AccountRepo
        + ActivityLedgerRepo
        + CompetitionRegistryRepo
        + EnrollmentRepo
        + ActivityTypeRepo
        + JournalRepo
{
}

impl AccountRepo for LedgerStore {
    fn insert_account_row(&mut self, record: AccountProfile) -> Result<(), StorageError> {
        self.insert_account(record)
    }

    fn upsert_account_row(&mut self, record: AccountProfile) -> Result<(), StorageError> {
        self.upsert_account(record)
    }

    fn account_row(&self, principal: &Principal) -> Option<&AccountProfile> {
        self.get_account(principal)
    }

    fn account_rows(&self) -> &BTreeMap<Principal, AccountProfile> {
        LedgerStore::account_rows(self)
    }

    fn bump_account_activity_row(&mut self, owner: &Principal, at: ClockValue) -> bool {
        self.record_account_activity(owner, at)
    }
}

impl ActivityLedgerRepo for LedgerStore {
    fn next_activity_id(&self) -> ActivityId {
        LedgerStore::next_activity_id(self)
    }

    fn last_activity_id(&self) -> u64 {
        LedgerStore::last_activity_id(self)
    }

    fn append_activity_ledger_row(&mut self, record: ActivityRecord) -> Result<ActivityId, StorageError> {
        self.append_activity_row(record)
    }

    fn activity_row(&self, activity_id: ActivityId, owner: &Principal) -> Option<&ActivityRecord> {
        self.get_activity(activity_id, owner)
    }

    fn activity_rows_for_owner(&self, owner: &Principal) -> Vec<&ActivityRecord> {
        self.activities_for_owner(owner)
    }

    fn owner_has_category_in_day(
        &self,
        owner: &Principal,
        category: &ActivityCategory,
        at: ClockValue,
        clock_units_per_day: u64,
    ) -> bool {
        LedgerStore::owner_has_category_in_day(self, owner, category, at, clock_units_per_day)
    }
}

impl CompetitionRegistryRepo for LedgerStore {
    fn next_competition_id(&self) -> CompetitionId {
        LedgerStore::next_competition_id(self)
    }

    fn last_competition_id(&self) -> u64 {
        LedgerStore::last_competition_id(self)
    }

    fn append_competition_row(&mut self, record: Competition) -> Result<CompetitionId, StorageError> {
        LedgerStore::append_competition_row(self, record)
    }

    fn competition_row(&self, competition_id: CompetitionId) -> Option<&Competition> {
        self.get_competition(competition_id)
    }

    fn set_competition_operational_row(
        &mut self,
        competition_id: CompetitionId,
        is_operational: bool,
    ) -> Result<(), StorageError> {
        self.set_competition_operational(competition_id, is_operational)
    }
}

impl EnrollmentRepo for LedgerStore {
    fn insert_enrollment_row(&mut self, record: Enrollment) -> Result<(), StorageError> {
        self.insert_enrollment(record)
    }

    fn upsert_enrollment_row(&mut self, record: Enrollment) -> Result<(), StorageError> {
        self.upsert_enrollment(record)
    }

    fn enrollment_row(&self, competition_id: CompetitionId, participant: &Principal) -> Option<&Enrollment> {
        self.get_enrollment(competition_id, participant)
    }

    fn enrollment_rows_for_competition(&self, competition_id: CompetitionId) -> Vec<&Enrollment> {
        self.enrollments_for_competition(competition_id)
    }
}

impl ActivityTypeRepo for LedgerStore {
    fn insert_activity_type_row(&mut self, category: ActivityCategory) -> Result<bool, StorageError> {
        self.insert_activity_type(category)
    }

    fn has_activity_type_row(&self, category: &ActivityCategory) -> bool {
        self.has_activity_type(category)
    }

    fn activity_type_rows(&self) -> &BTreeSet<ActivityCategory> {
        LedgerStore::activity_type_rows(self)
    }
}

impl JournalRepo for LedgerStore {
    fn stage_journal_row(&self, input: JournalEntryInput) -> Result<JournalEntry, StorageError> {
        self.stage_journal_entry(input)
    }

    fn commit_journal_row(&mut self, entry: JournalEntry) -> Result<JournalEntryId, StorageError> {
        self.commit_journal_entry(entry)
    }

    fn journal_rows(&self) -> &[JournalEntry] {
        LedgerStore::journal_rows(self)
    }

    fn verify_journal_rows(&self) -> Result<(), StorageError> {
        self.verify_journal_chain()
    }

    fn last_committed_clock(&self) -> Option<ClockValue> {
        LedgerStore::last_committed_clock(self)
    }

    fn note_committed_clock(&mut self, clock: ClockValue) {
        LedgerStore::note_committed_clock(self, clock)
    }
}
