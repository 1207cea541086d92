#![forbid(unsafe_code)]

use proptest::prelude::*;

use stride_kernel_contracts::account::DisplayName;
use stride_kernel_contracts::activity::{ActivityCategory, ActivityId, ActivityNotes, ActivitySubmission};
use stride_kernel_contracts::competition::{
    CompetitionDescription, CompetitionId, CompetitionLaunch, CompetitionStatus, CompetitionTitle,
};
use stride_kernel_contracts::refusal::reason_codes;
use stride_kernel_contracts::{ClockValue, Principal};
use stride_os::{CallContext, LedgerEngine, LedgerError, LedgerWiringConfig};

fn user(id: &str) -> Principal {
    Principal::new(id).unwrap()
}

fn at(caller: &str, clock: u64) -> CallContext {
    CallContext::new(user(caller), ClockValue(clock))
}

fn legacy() -> LedgerEngine {
    LedgerEngine::new_in_memory(LedgerWiringConfig::default()).unwrap()
}

fn activity(category: &str, duration: u64, energy: u64) -> ActivitySubmission {
    ActivitySubmission::v1(ActivityCategory::new(category).unwrap(), duration, energy, None)
}

fn launch(start: u64, end: u64, target: u64, min: u64, reward: u64) -> CompetitionLaunch {
    CompetitionLaunch::v1(
        CompetitionTitle::new("Autumn Ten").unwrap(),
        CompetitionDescription::new("Ten sessions before the frost").unwrap(),
        ClockValue(start),
        ClockValue(end),
        target,
        min,
        reward,
    )
}

fn code(err: LedgerError) -> u32 {
    err.reason_code().map(|c| c.0).unwrap_or(0)
}

#[test]
fn at_ledger_01_running_cycling_yoga_scenario() {
    let mut e = legacy();
    let u = "lw_user_1";
    e.setup_account(&at(u, 100), DisplayName::new("Ultra Runner").unwrap())
        .unwrap();

    let runs = [("running", 30, 300), ("cycling", 60, 500), ("yoga", 45, 150)];
    let mut ids = Vec::new();
    for (i, (cat, dur, energy)) in runs.iter().enumerate() {
        ids.push(
            e.submit_activity(&at(u, 101 + i as u64), activity(cat, *dur, *energy))
                .unwrap(),
        );
    }
    assert_eq!(ids, vec![ActivityId(1), ActivityId(2), ActivityId(3)]);

    let profile = e.query_account_info(&user(u)).unwrap();
    assert_eq!(profile.display_name.as_str(), "Ultra Runner");
    assert_eq!(profile.activity_count, 3);
    assert_eq!(profile.most_recent_activity, Some(ClockValue(103)));
    assert_eq!(profile.enrollment_timestamp, ClockValue(100));

    let cycling = e.fetch_activity_by_id(ActivityId(2), &user(u)).unwrap();
    assert_eq!(cycling.category.as_str(), "cycling");
    assert_eq!(cycling.duration_minutes, 60);
    assert_eq!(cycling.energy_expenditure, 500);
    assert_eq!(cycling.block_timestamp, ClockValue(102));
    assert!(cycling.notes.is_none());
}

#[test]
fn at_ledger_02_enrollment_window_scenario() {
    let mut e = legacy();
    let organizer = "lw_org_1";
    let runner = "lw_runner_1";
    let clock = 1_000;
    let cid = e
        .launch_competition(&at(organizer, clock), launch(clock + 10, clock + 100, 15, 20, 1000))
        .unwrap();
    assert_eq!(cid, CompetitionId(1));

    let c = e.fetch_competition_info(cid).unwrap();
    assert_eq!(c.organizer, user(organizer));
    assert_eq!(c.required_activities, 15);
    assert_eq!(c.minimum_session_duration, 20);
    assert_eq!(c.reward_amount, 1000);
    assert!(c.is_operational);

    let err = e.enroll_in_competition(&at(runner, clock + 5), cid).unwrap_err();
    assert_eq!(code(err), 106);
    assert!(e.check_competition_enrollment(cid, &user(runner)).is_none());

    e.enroll_in_competition(&at(runner, clock + 10), cid).unwrap();
    let en = e.check_competition_enrollment(cid, &user(runner)).unwrap();
    assert_eq!(en.enrollment_time, ClockValue(clock + 10));
    assert_eq!(en.activities_logged, 0);
    assert!(!en.has_completed_target);

    // Last block of the window is still active; one past it is not.
    e.enroll_in_competition(&at("lw_runner_2", clock + 100), cid).unwrap();
    let err = e.enroll_in_competition(&at("lw_runner_3", clock + 101), cid).unwrap_err();
    assert_eq!(code(err), 106);
}

#[test]
fn at_ledger_03_zero_duration_has_no_side_effects() {
    let mut e = legacy();
    let u = "lw_user_2";
    e.setup_account(&at(u, 1), DisplayName::new("Z").unwrap()).unwrap();
    let err = e.submit_activity(&at(u, 2), activity("running", 0, 10)).unwrap_err();
    assert_eq!(err.reason_code(), Some(reason_codes::INVALID_PARAMETERS));

    assert_eq!(e.last_activity_id(), 0);
    assert!(e.list_activities_for(&user(u)).is_empty());
    let p = e.query_account_info(&user(u)).unwrap();
    assert_eq!(p.activity_count, 0);
    assert_eq!(p.most_recent_activity, None);
    assert_eq!(e.journal().len(), 1);

    // The next valid submission still receives id 1.
    assert_eq!(
        e.submit_activity(&at(u, 3), activity("running", 5, 10)).unwrap(),
        ActivityId(1)
    );
}

#[test]
fn at_ledger_04_each_launch_precondition_refuses_without_allocation() {
    let mut e = legacy();
    let c = 500;
    let bad = [
        launch(c + 10, c + 10, 1, 1, 0),
        launch(c + 20, c + 10, 1, 1, 0),
        launch(c - 1, c + 10, 1, 1, 0),
        launch(c, c + 10, 0, 1, 0),
        launch(c, c + 10, 1, 0, 0),
    ];
    for l in bad {
        let err = e.launch_competition(&at("lw_org_2", c), l).unwrap_err();
        assert_eq!(code(err), 109);
    }
    assert_eq!(e.last_competition_id(), 0);
    assert!(e.fetch_competition_info(CompetitionId(1)).is_none());
    assert!(e.journal().is_empty());

    // start == clock is allowed.
    assert_eq!(
        e.launch_competition(&at("lw_org_2", c), launch(c, c + 10, 1, 1, 0))
            .unwrap(),
        CompetitionId(1)
    );
}

#[test]
fn at_ledger_05_owners_are_isolated() {
    let mut e = legacy();
    e.setup_account(&at("lw_a", 1), DisplayName::new("A").unwrap()).unwrap();
    e.setup_account(&at("lw_b", 1), DisplayName::new("B").unwrap()).unwrap();
    let id = e.submit_activity(&at("lw_a", 2), activity("yoga", 20, 90)).unwrap();

    assert!(e.fetch_activity_by_id(id, &user("lw_a")).is_some());
    assert!(e.fetch_activity_by_id(id, &user("lw_b")).is_none());
    assert_eq!(e.query_account_info(&user("lw_b")).unwrap().activity_count, 0);
    assert!(e.list_activities_for(&user("lw_b")).is_empty());
}

#[test]
fn at_ledger_06_activity_without_profile_is_recorded_but_not_aggregated() {
    let mut e = legacy();
    let id = e
        .submit_activity(&at("lw_ghost", 7), activity("swimming", 25, 200))
        .unwrap();
    assert_eq!(id, ActivityId(1));
    assert!(e.fetch_activity_by_id(id, &user("lw_ghost")).is_some());
    assert!(e.query_account_info(&user("lw_ghost")).is_none());
}

#[test]
fn at_ledger_07_setup_account_overwrites_and_resets_aggregate() {
    let mut e = legacy();
    let u = "lw_user_3";
    e.setup_account(&at(u, 1), DisplayName::new("First").unwrap()).unwrap();
    e.submit_activity(&at(u, 2), activity("running", 10, 10)).unwrap();
    e.setup_account(&at(u, 3), DisplayName::new("Second").unwrap()).unwrap();

    let p = e.query_account_info(&user(u)).unwrap();
    assert_eq!(p.display_name.as_str(), "Second");
    assert_eq!(p.activity_count, 0);
    assert_eq!(p.most_recent_activity, None);
    assert_eq!(p.enrollment_timestamp, ClockValue(3));
    // The activity itself is untouched.
    assert!(e.fetch_activity_by_id(ActivityId(1), &user(u)).is_some());
}

#[test]
fn at_ledger_08_reenrollment_overwrites_in_legacy_profile() {
    let mut e = legacy();
    let cid = e
        .launch_competition(&at("lw_org_3", 0), launch(0, 100, 3, 10, 0))
        .unwrap();
    e.enroll_in_competition(&at("lw_user_4", 5), cid).unwrap();
    e.enroll_in_competition(&at("lw_user_4", 9), cid).unwrap();
    let en = e.check_competition_enrollment(cid, &user("lw_user_4")).unwrap();
    assert_eq!(en.enrollment_time, ClockValue(9));
    assert_eq!(e.list_enrollments_for(cid).len(), 1);
}

#[test]
fn at_ledger_09_legacy_dead_checks_stay_dead() {
    let mut e = legacy();
    // Unknown competition surfaces as inactive, not missing.
    let err = e
        .enroll_in_competition(&at("lw_user_5", 1), CompetitionId(42))
        .unwrap_err();
    assert_eq!(code(err), 106);

    // Unregistered categories and same-day duplicates are accepted.
    e.submit_activity(&at("lw_user_5", 2), activity("curling", 10, 1)).unwrap();
    e.submit_activity(&at("lw_user_5", 2), activity("curling", 10, 1)).unwrap();
    assert_eq!(e.list_activities_for(&user("lw_user_5")).len(), 2);

    // Deactivation has no legacy producer.
    let cid = e
        .launch_competition(&at("lw_org_5", 3), launch(3, 10, 1, 1, 0))
        .unwrap();
    let err = e.deactivate_competition(&at("lw_org_5", 3), cid).unwrap_err();
    assert_eq!(code(err), 100);
    assert!(e.fetch_competition_info(cid).unwrap().is_operational);
}

#[test]
fn at_ledger_10_activity_type_registration_always_unauthorized() {
    let mut cfg = LedgerWiringConfig::default();
    cfg.administrator = Some(user("lw_admin"));
    let mut e = LedgerEngine::new_in_memory(cfg).unwrap();
    let yoga = ActivityCategory::new("yoga").unwrap();
    for caller in ["lw_admin", "lw_user_6"] {
        let err = e
            .register_activity_type(&at(caller, 1), yoga.clone())
            .unwrap_err();
        assert_eq!(code(err), 100);
    }
    assert!(!e.is_registered_activity_type(&yoga));
    assert!(e.journal().is_empty());
}

#[test]
fn at_ledger_16_reserved_identity_cannot_be_decoded_as_a_caller() {
    let mut e = legacy();
    let decoded = serde_json::from_str::<Principal>(r#""@stride.ledger""#);
    assert!(decoded.is_err());
    // Whatever identity a serving layer manages to decode, registration is refused.
    for raw in [r#""stride.ledger""#, r#""lw_admin""#] {
        let caller: Principal = serde_json::from_str(raw).unwrap();
        let err = e
            .register_activity_type(
                &CallContext::new(caller, ClockValue(1)),
                ActivityCategory::new("yoga").unwrap(),
            )
            .unwrap_err();
        assert_eq!(code(err), 100);
    }
    assert!(!e.is_registered_activity_type(&ActivityCategory::new("yoga").unwrap()));
}

#[test]
fn at_ledger_11_text_bounds_surface_as_invalid_parameters() {
    let mut e = legacy();
    let long_notes = ActivityNotes::new("n".repeat(201)).unwrap_err();
    assert_eq!(code(long_notes.into()), 109);
    let long_name = DisplayName::new("é".repeat(51)).unwrap_err();
    assert_eq!(code(long_name.into()), 109);

    // Exactly at the bound is accepted.
    e.setup_account(&at("lw_user_7", 1), DisplayName::new("é".repeat(50)).unwrap())
        .unwrap();
    let notes = ActivityNotes::new("n".repeat(200)).unwrap();
    let s = ActivitySubmission::v1(ActivityCategory::new("hiking").unwrap(), 90, 700, Some(notes));
    e.submit_activity(&at("lw_user_7", 2), s).unwrap();
}

#[test]
fn at_ledger_12_competition_status_tracks_clock() {
    let mut e = legacy();
    let cid = e
        .launch_competition(&at("lw_org_6", 10), launch(20, 30, 1, 1, 0))
        .unwrap();
    assert_eq!(e.competition_status(cid, ClockValue(19)), Some(CompetitionStatus::NotStarted));
    assert_eq!(e.competition_status(cid, ClockValue(20)), Some(CompetitionStatus::Active));
    assert_eq!(e.competition_status(cid, ClockValue(30)), Some(CompetitionStatus::Active));
    assert_eq!(e.competition_status(cid, ClockValue(31)), Some(CompetitionStatus::Concluded));
    assert_eq!(e.competition_status(CompetitionId(9), ClockValue(20)), None);
}

#[test]
fn at_ledger_13_journal_chain_verifies_after_mixed_traffic() {
    let mut e = legacy();
    e.setup_account(&at("lw_user_8", 1), DisplayName::new("J").unwrap()).unwrap();
    e.submit_activity(&at("lw_user_8", 2), activity("running", 10, 10)).unwrap();
    let _ = e.submit_activity(&at("lw_user_8", 3), activity("running", 0, 10));
    let cid = e
        .launch_competition(&at("lw_org_8", 4), launch(4, 40, 2, 5, 0))
        .unwrap();
    e.enroll_in_competition(&at("lw_user_8", 5), cid).unwrap();

    let names: Vec<&str> = e.journal().iter().map(|j| j.operation.name()).collect();
    assert_eq!(
        names,
        vec![
            "setup-account",
            "submit-activity",
            "launch-competition",
            "enroll-in-competition"
        ]
    );
    e.verify_journal().unwrap();
}

proptest! {
    #[test]
    fn at_ledger_14_count_and_ids_follow_submissions(
        durations in proptest::collection::vec(0u64..120, 1..40)
    ) {
        let mut e = legacy();
        let u = "lw_prop_1";
        e.setup_account(&at(u, 0), DisplayName::new("P").unwrap()).unwrap();

        let mut accepted = 0u64;
        let mut last_clock = None;
        for (i, d) in durations.iter().enumerate() {
            let clock = i as u64 + 1;
            match e.submit_activity(&at(u, clock), activity("running", *d, 0)) {
                Ok(id) => {
                    accepted += 1;
                    prop_assert_eq!(id, ActivityId(accepted));
                    last_clock = Some(ClockValue(clock));
                }
                Err(err) => {
                    prop_assert_eq!(*d, 0);
                    prop_assert_eq!(code(err), 109);
                }
            }
        }
        let p = e.query_account_info(&user(u)).unwrap();
        prop_assert_eq!(p.activity_count, accepted);
        prop_assert_eq!(p.most_recent_activity, last_clock);
        prop_assert_eq!(e.last_activity_id(), accepted);
    }

    #[test]
    fn at_ledger_15_ids_are_global_across_interleaved_owners(
        owners in proptest::collection::vec(0usize..4, 1..30)
    ) {
        let mut e = legacy();
        let names = ["lw_p0", "lw_p1", "lw_p2", "lw_p3"];
        for (i, o) in owners.iter().enumerate() {
            let id = e.submit_activity(&at(names[*o], 1), activity("cycling", 10, 0)).unwrap();
            prop_assert_eq!(id, ActivityId(i as u64 + 1));
            prop_assert!(e.fetch_activity_by_id(id, &user(names[*o])).is_some());
        }
        let total: usize = names.iter().map(|n| e.list_activities_for(&user(n)).len()).sum();
        prop_assert_eq!(total, owners.len());
    }
}
