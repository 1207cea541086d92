#![forbid(unsafe_code)]

use stride_kernel_contracts::competition::{
    Competition, CompetitionDescription, CompetitionId, CompetitionLaunch, CompetitionTitle,
};
use stride_kernel_contracts::enrollment::Enrollment;
use stride_kernel_contracts::{ClockValue, Principal};
use stride_storage::repo::{CompetitionRegistryRepo, EnrollmentRepo};
use stride_storage::store::{LedgerStore, StorageError};

fn user(id: &str) -> Principal {
    Principal::new(id).unwrap()
}

fn store_with_competition() -> (LedgerStore, CompetitionId) {
    let mut s = LedgerStore::new_in_memory();
    let c = Competition::from_launch_v1(
        s.next_competition_id(),
        user("dbw_enr_org"),
        CompetitionLaunch::v1(
            CompetitionTitle::new("Yoga month").unwrap(),
            CompetitionDescription::new("").unwrap(),
            ClockValue(10),
            ClockValue(100),
            5,
            15,
            0,
        ),
    )
    .unwrap();
    let id = s.append_competition_row(c).unwrap();
    (s, id)
}

#[test]
fn at_enrollments_db_01_foreign_key_to_competition_enforced() {
    let mut s = LedgerStore::new_in_memory();
    let e = Enrollment::v1(CompetitionId(7), user("dbw_enr_a"), ClockValue(1)).unwrap();
    assert!(matches!(
        s.upsert_enrollment_row(e),
        Err(StorageError::ForeignKeyViolation { .. })
    ));
}

#[test]
fn at_enrollments_db_02_insert_rejects_second_enrollment() {
    let (mut s, cid) = store_with_competition();
    s.insert_enrollment_row(Enrollment::v1(cid, user("dbw_enr_a"), ClockValue(12)).unwrap())
        .unwrap();
    assert!(matches!(
        s.insert_enrollment_row(Enrollment::v1(cid, user("dbw_enr_a"), ClockValue(13)).unwrap()),
        Err(StorageError::DuplicateKey {
            table: "enrollments",
            ..
        })
    ));
    assert_eq!(
        s.enrollment_row(cid, &user("dbw_enr_a")).unwrap().enrollment_time,
        ClockValue(12)
    );
}

#[test]
fn at_enrollments_db_03_upsert_resets_record() {
    let (mut s, cid) = store_with_competition();
    let mut first = Enrollment::v1(cid, user("dbw_enr_a"), ClockValue(12)).unwrap();
    first.activities_logged = 3;
    s.upsert_enrollment_row(first).unwrap();
    s.upsert_enrollment_row(Enrollment::v1(cid, user("dbw_enr_a"), ClockValue(20)).unwrap())
        .unwrap();
    let e = s.enrollment_row(cid, &user("dbw_enr_a")).unwrap();
    assert_eq!(e.enrollment_time, ClockValue(20));
    assert_eq!(e.activities_logged, 0);
    assert!(!e.has_completed_target);
}

#[test]
fn at_enrollments_db_04_per_competition_listing_is_isolated() {
    let (mut s, cid) = store_with_competition();
    for p in ["dbw_enr_a", "dbw_enr_b"] {
        s.insert_enrollment_row(Enrollment::v1(cid, user(p), ClockValue(15)).unwrap())
            .unwrap();
    }
    assert_eq!(s.enrollment_rows_for_competition(cid).len(), 2);
    assert!(s.enrollment_rows_for_competition(CompetitionId(2)).is_empty());
}
