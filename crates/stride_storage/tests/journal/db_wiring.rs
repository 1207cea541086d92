#![forbid(unsafe_code)]

use stride_kernel_contracts::account::DisplayName;
use stride_kernel_contracts::competition::CompetitionId;
use stride_kernel_contracts::journal::{
    JournalEntryId, JournalEntryInput, LedgerOperation, OperationOutcome, JOURNAL_GENESIS_HASH,
};
use stride_kernel_contracts::{ClockValue, Principal};
use stride_storage::repo::JournalRepo;
use stride_storage::store::{verify_journal_chain, LedgerStore, StorageError};

fn caller() -> Principal {
    Principal::new("dbw_journal_user").unwrap()
}

fn setup_input(at: u64, name: &str) -> JournalEntryInput {
    JournalEntryInput::v1(
        caller(),
        ClockValue(at),
        LedgerOperation::SetupAccount {
            display_name: DisplayName::new(name).unwrap(),
        },
        OperationOutcome::Ok,
    )
    .unwrap()
}

fn enroll_input(at: u64) -> JournalEntryInput {
    JournalEntryInput::v1(
        caller(),
        ClockValue(at),
        LedgerOperation::EnrollInCompetition {
            competition_id: CompetitionId(1),
        },
        OperationOutcome::Ok,
    )
    .unwrap()
}

#[test]
fn at_journal_db_01_entries_chain_from_genesis() {
    let mut s = LedgerStore::new_in_memory();
    s.append_journal_entry(setup_input(1, "Ana")).unwrap();
    s.append_journal_entry(enroll_input(2)).unwrap();

    let rows = JournalRepo::journal_rows(&s);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].prev_hash, JOURNAL_GENESIS_HASH);
    assert_eq!(rows[1].prev_hash, rows[0].entry_hash);
    assert!(s.verify_journal_rows().is_ok());
}

#[test]
fn at_journal_db_02_staging_does_not_write() {
    let mut s = LedgerStore::new_in_memory();
    let staged = s.stage_journal_row(setup_input(1, "Ana")).unwrap();
    assert!(s.journal_rows().is_empty());
    assert_eq!(s.commit_journal_row(staged).unwrap(), JournalEntryId(1));
}

#[test]
fn at_journal_db_03_stale_staged_entry_cannot_commit() {
    let mut s = LedgerStore::new_in_memory();
    let stale = s.stage_journal_row(setup_input(1, "Ana")).unwrap();
    s.append_journal_entry(enroll_input(1)).unwrap();
    assert!(s.commit_journal_row(stale).is_err());
    assert_eq!(s.journal_rows().len(), 1);
}

#[test]
fn at_journal_db_04_tampering_breaks_verification() {
    let mut s = LedgerStore::new_in_memory();
    s.append_journal_entry(setup_input(1, "Ana")).unwrap();
    s.append_journal_entry(setup_input(2, "Ana B.")).unwrap();

    let mut tampered = s.journal_rows().to_vec();
    tampered[0].clock = ClockValue(99);
    assert_eq!(
        verify_journal_chain(&tampered),
        Err(StorageError::JournalChainBroken { entry_id: 1 })
    );
}

#[test]
fn at_journal_db_05_append_only_enforced() {
    let mut s = LedgerStore::new_in_memory();
    let id = s.append_journal_entry(setup_input(1, "Ana")).unwrap();
    assert!(matches!(
        s.attempt_overwrite_journal_entry(id),
        Err(StorageError::AppendOnlyViolation { table: "journal" })
    ));
}
