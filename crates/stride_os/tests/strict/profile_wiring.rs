#![forbid(unsafe_code)]

use stride_kernel_contracts::account::DisplayName;
use stride_kernel_contracts::activity::{ActivityCategory, ActivitySubmission};
use stride_kernel_contracts::competition::{
    CompetitionDescription, CompetitionId, CompetitionLaunch, CompetitionStatus, CompetitionTitle,
};
use stride_kernel_contracts::{ClockValue, Principal};
use stride_os::{CallContext, LedgerEngine, LedgerError, LedgerWiringConfig};

const ADMIN: &str = "st_admin";

fn user(id: &str) -> Principal {
    Principal::new(id).unwrap()
}

fn at(caller: &str, clock: u64) -> CallContext {
    CallContext::new(user(caller), ClockValue(clock))
}

fn cat(c: &str) -> ActivityCategory {
    ActivityCategory::new(c).unwrap()
}

fn strict() -> LedgerEngine {
    let cfg = LedgerWiringConfig::strict_v1(Some(user(ADMIN)), vec![cat("running"), cat("yoga")]);
    LedgerEngine::new_in_memory(cfg).unwrap()
}

fn activity(category: &str, duration: u64) -> ActivitySubmission {
    ActivitySubmission::v1(cat(category), duration, 100, None)
}

fn launch(start: u64, end: u64) -> CompetitionLaunch {
    CompetitionLaunch::v1(
        CompetitionTitle::new("Strict Cup").unwrap(),
        CompetitionDescription::new("").unwrap(),
        ClockValue(start),
        ClockValue(end),
        3,
        15,
        50,
    )
}

fn code(err: LedgerError) -> u32 {
    err.reason_code().map(|c| c.0).unwrap_or(0)
}

#[test]
fn at_strict_01_seeded_types_are_registered() {
    let e = strict();
    assert!(e.is_registered_activity_type(&cat("running")));
    assert!(e.is_registered_activity_type(&cat("yoga")));
    assert!(!e.is_registered_activity_type(&cat("cycling")));
    assert!(e.journal().is_empty());
}

#[test]
fn at_strict_02_second_setup_is_account_exists() {
    let mut e = strict();
    e.setup_account(&at("st_u1", 1), DisplayName::new("One").unwrap()).unwrap();
    let err = e
        .setup_account(&at("st_u1", 2), DisplayName::new("Two").unwrap())
        .unwrap_err();
    assert_eq!(code(err), 101);
    assert_eq!(e.query_account_info(&user("st_u1")).unwrap().display_name.as_str(), "One");
}

#[test]
fn at_strict_03_submit_activity_check_order() {
    let mut e = strict();
    // Duration is checked before the profile.
    assert_eq!(code(e.submit_activity(&at("st_u2", 1), activity("running", 0)).unwrap_err()), 109);
    assert_eq!(code(e.submit_activity(&at("st_u2", 1), activity("running", 10)).unwrap_err()), 102);

    e.setup_account(&at("st_u2", 1), DisplayName::new("Two").unwrap()).unwrap();
    assert_eq!(code(e.submit_activity(&at("st_u2", 2), activity("cycling", 10)).unwrap_err()), 107);

    e.submit_activity(&at("st_u2", 2), activity("running", 10)).unwrap();
    assert_eq!(code(e.submit_activity(&at("st_u2", 143), activity("running", 10)).unwrap_err()), 108);
    // A different category on the same day is fine, and so is the next day.
    e.submit_activity(&at("st_u2", 143), activity("yoga", 10)).unwrap();
    e.submit_activity(&at("st_u2", 144), activity("running", 10)).unwrap();

    assert_eq!(e.last_activity_id(), 3);
    assert_eq!(e.query_account_info(&user("st_u2")).unwrap().activity_count, 3);
}

#[test]
fn at_strict_04_duplicate_daily_entry_is_per_owner() {
    let mut e = strict();
    for u in ["st_u3", "st_u4"] {
        e.setup_account(&at(u, 1), DisplayName::new(u).unwrap()).unwrap();
        e.submit_activity(&at(u, 5), activity("yoga", 30)).unwrap();
    }
    assert_eq!(e.last_activity_id(), 2);
}

#[test]
fn at_strict_05_enrollment_check_order() {
    let mut e = strict();
    assert_eq!(code(e.enroll_in_competition(&at("st_u5", 1), CompetitionId(1)).unwrap_err()), 103);

    let cid = e.launch_competition(&at("st_org", 1), launch(10, 20)).unwrap();
    assert_eq!(code(e.enroll_in_competition(&at("st_u5", 9), cid).unwrap_err()), 106);
    e.enroll_in_competition(&at("st_u5", 10), cid).unwrap();
    assert_eq!(code(e.enroll_in_competition(&at("st_u5", 11), cid).unwrap_err()), 104);
    assert_eq!(code(e.enroll_in_competition(&at("st_u6", 21), cid).unwrap_err()), 105);

    // Re-enrollment refusal leaves the original record.
    let en = e.check_competition_enrollment(cid, &user("st_u5")).unwrap();
    assert_eq!(en.enrollment_time, ClockValue(10));
}

#[test]
fn at_strict_06_deactivation_closes_enrollment() {
    let mut e = strict();
    let cid = e.launch_competition(&at("st_org", 1), launch(1, 100)).unwrap();
    assert_eq!(code(e.deactivate_competition(&at("st_u7", 2), cid).unwrap_err()), 110);
    assert_eq!(
        code(e.deactivate_competition(&at("st_org", 2), CompetitionId(77)).unwrap_err()),
        103
    );

    e.deactivate_competition(&at("st_org", 2), cid).unwrap();
    assert!(!e.fetch_competition_info(cid).unwrap().is_operational);
    assert_eq!(e.competition_status(cid, ClockValue(3)), Some(CompetitionStatus::Deactivated));
    assert_eq!(code(e.enroll_in_competition(&at("st_u7", 3), cid).unwrap_err()), 106);
}

#[test]
fn at_strict_07_only_admin_registers_activity_types() {
    let mut e = strict();
    assert_eq!(
        code(e.register_activity_type(&at("st_u8", 1), cat("cycling")).unwrap_err()),
        100
    );
    e.register_activity_type(&at(ADMIN, 1), cat("cycling")).unwrap();
    assert!(e.is_registered_activity_type(&cat("cycling")));

    e.setup_account(&at("st_u8", 2), DisplayName::new("Eight").unwrap()).unwrap();
    e.submit_activity(&at("st_u8", 3), activity("cycling", 40)).unwrap();
}

#[test]
fn at_strict_08_refusals_never_touch_the_journal() {
    let mut e = strict();
    let _ = e.submit_activity(&at("st_u9", 1), activity("running", 10));
    let _ = e.enroll_in_competition(&at("st_u9", 1), CompetitionId(1));
    let _ = e.register_activity_type(&at("st_u9", 1), cat("chess"));
    assert!(e.journal().is_empty());
    assert_eq!(e.store().last_committed_clock(), None);
}
