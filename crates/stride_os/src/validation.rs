#![forbid(unsafe_code)]

//! Preconditions of every mutating ledger operation.
//!
//! Each check is a pure read over committed state and returns the first failing
//! precondition. The engine runs the matching check before staging any write, so a
//! refusal always leaves the ledger untouched.

use stride_kernel_contracts::activity::{ActivityCategory, ActivitySubmission};
use stride_kernel_contracts::competition::{CompetitionId, CompetitionLaunch};
use stride_kernel_contracts::{LedgerRefusal, Validate};
use stride_storage::repo::LedgerRepo;

use crate::config::LedgerWiringConfig;
use crate::context::CallContext;

pub fn check_setup_account<S: LedgerRepo>(
    config: &LedgerWiringConfig,
    store: &S,
    ctx: &CallContext,
) -> Result<(), LedgerRefusal> {
    if config.is_strict() && store.account_row(&ctx.caller).is_some() {
        return Err(LedgerRefusal::AccountExists);
    }
    Ok(())
}

pub fn check_submit_activity<S: LedgerRepo>(
    config: &LedgerWiringConfig,
    store: &S,
    ctx: &CallContext,
    submission: &ActivitySubmission,
) -> Result<(), LedgerRefusal> {
    if submission.duration_minutes == 0 {
        return Err(LedgerRefusal::invalid_parameters(
            "activity_submission.duration_minutes",
            "must be > 0",
        ));
    }
    submission.validate()?;

    if !config.is_strict() {
        return Ok(());
    }
    if store.account_row(&ctx.caller).is_none() {
        return Err(LedgerRefusal::AccountMissing);
    }
    if !store.has_activity_type_row(&submission.category) {
        return Err(LedgerRefusal::InvalidActivityType);
    }
    if store.owner_has_category_in_day(
        &ctx.caller,
        &submission.category,
        ctx.clock,
        config.clock_units_per_day,
    ) {
        return Err(LedgerRefusal::DuplicateDailyEntry);
    }
    Ok(())
}

/// Checks run in a fixed order: window ordering, no retroactive start, target, minimum
/// session duration. All four surface as invalid-parameters.
pub fn check_launch_competition(
    ctx: &CallContext,
    launch: &CompetitionLaunch,
) -> Result<(), LedgerRefusal> {
    if launch.start_clock >= launch.end_clock {
        return Err(LedgerRefusal::invalid_parameters(
            "competition_launch.start_clock",
            "must be < end_clock",
        ));
    }
    if launch.start_clock < ctx.clock {
        return Err(LedgerRefusal::invalid_parameters(
            "competition_launch.start_clock",
            "must not be in the past",
        ));
    }
    if launch.required_activities == 0 {
        return Err(LedgerRefusal::invalid_parameters(
            "competition_launch.required_activities",
            "must be > 0",
        ));
    }
    if launch.minimum_session_duration == 0 {
        return Err(LedgerRefusal::invalid_parameters(
            "competition_launch.minimum_session_duration",
            "must be > 0",
        ));
    }
    launch.validate()?;
    Ok(())
}

pub fn check_enroll_in_competition<S: LedgerRepo>(
    config: &LedgerWiringConfig,
    store: &S,
    ctx: &CallContext,
    competition_id: CompetitionId,
) -> Result<(), LedgerRefusal> {
    let Some(c) = store.competition_row(competition_id) else {
        return Err(if config.is_strict() {
            LedgerRefusal::CompetitionMissing
        } else {
            LedgerRefusal::CompetitionInactive
        });
    };

    if c.is_not_started_at(ctx.clock) {
        return Err(LedgerRefusal::CompetitionInactive);
    }
    if config.is_strict() {
        if c.is_concluded_at(ctx.clock) {
            return Err(LedgerRefusal::CompetitionConcluded);
        }
        if !c.is_active_at(ctx.clock) {
            return Err(LedgerRefusal::CompetitionInactive);
        }
        if store.enrollment_row(competition_id, &ctx.caller).is_some() {
            return Err(LedgerRefusal::AlreadyEnrolled);
        }
        return Ok(());
    }
    if !c.is_active_at(ctx.clock) {
        return Err(LedgerRefusal::CompetitionInactive);
    }
    Ok(())
}

/// Legacy: only the ledger's own identity may register, and no caller can hold it,
/// so registration is always refused.
pub fn check_register_activity_type(
    config: &LedgerWiringConfig,
    ctx: &CallContext,
    category: &ActivityCategory,
) -> Result<(), LedgerRefusal> {
    let authorized =
        config.is_strict() && config.administrator.as_ref() == Some(&ctx.caller);
    if !authorized {
        return Err(LedgerRefusal::Unauthorized);
    }
    category.validate()?;
    Ok(())
}

pub fn check_deactivate_competition<S: LedgerRepo>(
    config: &LedgerWiringConfig,
    store: &S,
    ctx: &CallContext,
    competition_id: CompetitionId,
) -> Result<(), LedgerRefusal> {
    if !config.is_strict() {
        return Err(LedgerRefusal::Unauthorized);
    }
    let Some(c) = store.competition_row(competition_id) else {
        return Err(LedgerRefusal::CompetitionMissing);
    };
    if c.organizer != ctx.caller {
        return Err(LedgerRefusal::NotOrganizer);
    }
    Ok(())
}
