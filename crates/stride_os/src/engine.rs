#![forbid(unsafe_code)]

use thiserror::Error;
use tracing::{debug, info};

use stride_kernel_contracts::account::{AccountProfile, DisplayName};
use stride_kernel_contracts::activity::{
    ActivityCategory, ActivityId, ActivityRecord, ActivitySubmission,
};
use stride_kernel_contracts::competition::{
    Competition, CompetitionId, CompetitionLaunch, CompetitionStatus,
};
use stride_kernel_contracts::enrollment::Enrollment;
use stride_kernel_contracts::journal::{
    JournalEntry, JournalEntryInput, LedgerOperation, OperationOutcome,
};
use stride_kernel_contracts::{
    ClockValue, ContractViolation, LedgerRefusal, Principal, ReasonCodeId, Validate,
};
use stride_storage::repo::LedgerRepo;
use stride_storage::store::{LedgerStore, StorageError};

use crate::config::LedgerWiringConfig;
use crate::context::CallContext;
use crate::validation;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    #[error("ledger refused the call: {0}")]
    Refused(#[from] LedgerRefusal),
    #[error("clock regressed: last committed {last}, got {got}")]
    ClockRegression { last: u64, got: u64 },
    #[error("invalid ledger config: {0}")]
    InvalidConfig(ContractViolation),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl LedgerError {
    /// Numeric code callers branch on; only refusals carry one.
    pub fn reason_code(&self) -> Option<ReasonCodeId> {
        match self {
            LedgerError::Refused(r) => Some(r.reason_code()),
            _ => None,
        }
    }

    pub fn refusal(&self) -> Option<&LedgerRefusal> {
        match self {
            LedgerError::Refused(r) => Some(r),
            _ => None,
        }
    }
}

impl From<ContractViolation> for LedgerError {
    fn from(v: ContractViolation) -> Self {
        LedgerError::Refused(v.into())
    }
}

/// Storage collisions that correspond to a caller-visible refusal.
fn storage_to_ledger_error(e: StorageError) -> LedgerError {
    match e {
        StorageError::DuplicateKey { table: "competitions", .. } => {
            LedgerError::Refused(LedgerRefusal::CompetitionExists)
        }
        StorageError::DuplicateKey { table: "accounts", .. } => {
            LedgerError::Refused(LedgerRefusal::AccountExists)
        }
        StorageError::DuplicateKey { table: "enrollments", .. } => {
            LedgerError::Refused(LedgerRefusal::AlreadyEnrolled)
        }
        StorageError::ForeignKeyViolation {
            table: "enrollments.competition_id",
            ..
        } => LedgerError::Refused(LedgerRefusal::CompetitionMissing),
        StorageError::ContractViolation(v) => LedgerError::Refused(v.into()),
        other => LedgerError::Storage(other),
    }
}

/// State-transition engine over the ledger tables.
///
/// Every mutating call follows the same order: clock guard, preconditions, journal
/// staging, then writes. Preconditions and staging are pure, and the single
/// fallible write of each operation fails before it touches any table, so a call
/// either commits every write plus its journal entry or leaves the ledger as it was.
#[derive(Debug, Clone)]
pub struct LedgerEngine<S = LedgerStore> {
    config: LedgerWiringConfig,
    store: S,
}

impl LedgerEngine<LedgerStore> {
    pub fn new_in_memory(config: LedgerWiringConfig) -> Result<Self, LedgerError> {
        Self::with_store(config, LedgerStore::new_in_memory())
    }
}

impl<S: LedgerRepo> LedgerEngine<S> {
    /// Wires the engine onto `store` and registers the configured seed categories.
    pub fn with_store(config: LedgerWiringConfig, mut store: S) -> Result<Self, LedgerError> {
        config.validate().map_err(LedgerError::InvalidConfig)?;
        for category in &config.seed_activity_types {
            store
                .insert_activity_type_row(category.clone())
                .map_err(LedgerError::Storage)?;
        }
        Ok(Self { config, store })
    }

    pub fn config(&self) -> &LedgerWiringConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ------------------------
    // Mutations.
    // ------------------------

    /// Dispatches a journaled operation. Used by replay and the shared handle.
    pub fn apply(
        &mut self,
        ctx: &CallContext,
        operation: LedgerOperation,
    ) -> Result<OperationOutcome, LedgerError> {
        match operation {
            LedgerOperation::SetupAccount { display_name } => {
                self.setup_account(ctx, display_name).map(|()| OperationOutcome::Ok)
            }
            LedgerOperation::SubmitActivity { submission } => self
                .submit_activity(ctx, submission)
                .map(OperationOutcome::Activity),
            LedgerOperation::LaunchCompetition { launch } => self
                .launch_competition(ctx, launch)
                .map(OperationOutcome::Competition),
            LedgerOperation::EnrollInCompetition { competition_id } => self
                .enroll_in_competition(ctx, competition_id)
                .map(|()| OperationOutcome::Ok),
            LedgerOperation::RegisterActivityType { category } => self
                .register_activity_type(ctx, category)
                .map(|()| OperationOutcome::Ok),
            LedgerOperation::DeactivateCompetition { competition_id } => self
                .deactivate_competition(ctx, competition_id)
                .map(|()| OperationOutcome::Ok),
        }
    }

    pub fn setup_account(
        &mut self,
        ctx: &CallContext,
        display_name: DisplayName,
    ) -> Result<(), LedgerError> {
        const OP: &str = "setup-account";
        self.guard_clock(OP, ctx)?;
        validation::check_setup_account(&self.config, &self.store, ctx)
            .map_err(|r| refused(OP, ctx, r))?;
        display_name.validate().map_err(|v| refused(OP, ctx, v.into()))?;

        let profile = AccountProfile::v1(ctx.caller.clone(), display_name.clone(), ctx.clock);
        let entry = self.stage(
            ctx,
            LedgerOperation::SetupAccount { display_name },
            OperationOutcome::Ok,
        )?;
        let written = if self.config.is_strict() {
            self.store.insert_account_row(profile)
        } else {
            self.store.upsert_account_row(profile)
        };
        written.map_err(|e| storage_refused(OP, ctx, e))?;
        self.commit(entry)?;

        info!(operation = OP, caller = %ctx.caller, clock = ctx.clock.0, "account set up");
        Ok(())
    }

    pub fn submit_activity(
        &mut self,
        ctx: &CallContext,
        submission: ActivitySubmission,
    ) -> Result<ActivityId, LedgerError> {
        const OP: &str = "submit-activity";
        self.guard_clock(OP, ctx)?;
        validation::check_submit_activity(&self.config, &self.store, ctx, &submission)
            .map_err(|r| refused(OP, ctx, r))?;

        let activity_id = self.store.next_activity_id();
        let record = ActivityRecord::from_submission_v1(
            activity_id,
            ctx.caller.clone(),
            ctx.clock,
            submission.clone(),
        )
        .map_err(|v| refused(OP, ctx, v.into()))?;
        let entry = self.stage(
            ctx,
            LedgerOperation::SubmitActivity { submission },
            OperationOutcome::Activity(activity_id),
        )?;
        self.store
            .append_activity_ledger_row(record)
            .map_err(|e| storage_refused(OP, ctx, e))?;
        let aggregated = self.store.bump_account_activity_row(&ctx.caller, ctx.clock);
        self.commit(entry)?;

        info!(
            operation = OP,
            caller = %ctx.caller,
            clock = ctx.clock.0,
            activity_id = activity_id.0,
            aggregated,
            "activity recorded"
        );
        Ok(activity_id)
    }

    pub fn launch_competition(
        &mut self,
        ctx: &CallContext,
        launch: CompetitionLaunch,
    ) -> Result<CompetitionId, LedgerError> {
        const OP: &str = "launch-competition";
        self.guard_clock(OP, ctx)?;
        validation::check_launch_competition(ctx, &launch).map_err(|r| refused(OP, ctx, r))?;

        let competition_id = self.store.next_competition_id();
        let competition =
            Competition::from_launch_v1(competition_id, ctx.caller.clone(), launch.clone())
                .map_err(|v| refused(OP, ctx, v.into()))?;
        let entry = self.stage(
            ctx,
            LedgerOperation::LaunchCompetition { launch },
            OperationOutcome::Competition(competition_id),
        )?;
        self.store
            .append_competition_row(competition)
            .map_err(|e| storage_refused(OP, ctx, e))?;
        self.commit(entry)?;

        info!(
            operation = OP,
            caller = %ctx.caller,
            clock = ctx.clock.0,
            competition_id = competition_id.0,
            "competition launched"
        );
        Ok(competition_id)
    }

    pub fn enroll_in_competition(
        &mut self,
        ctx: &CallContext,
        competition_id: CompetitionId,
    ) -> Result<(), LedgerError> {
        const OP: &str = "enroll-in-competition";
        self.guard_clock(OP, ctx)?;
        validation::check_enroll_in_competition(&self.config, &self.store, ctx, competition_id)
            .map_err(|r| refused(OP, ctx, r))?;

        let enrollment = Enrollment::v1(competition_id, ctx.caller.clone(), ctx.clock)
            .map_err(|v| refused(OP, ctx, v.into()))?;
        let entry = self.stage(
            ctx,
            LedgerOperation::EnrollInCompetition { competition_id },
            OperationOutcome::Ok,
        )?;
        let written = if self.config.is_strict() {
            self.store.insert_enrollment_row(enrollment)
        } else {
            self.store.upsert_enrollment_row(enrollment)
        };
        written.map_err(|e| storage_refused(OP, ctx, e))?;
        self.commit(entry)?;

        info!(
            operation = OP,
            caller = %ctx.caller,
            clock = ctx.clock.0,
            competition_id = competition_id.0,
            "enrolled"
        );
        Ok(())
    }

    pub fn register_activity_type(
        &mut self,
        ctx: &CallContext,
        category: ActivityCategory,
    ) -> Result<(), LedgerError> {
        const OP: &str = "register-activity-type";
        self.guard_clock(OP, ctx)?;
        validation::check_register_activity_type(&self.config, ctx, &category)
            .map_err(|r| refused(OP, ctx, r))?;

        let entry = self.stage(
            ctx,
            LedgerOperation::RegisterActivityType {
                category: category.clone(),
            },
            OperationOutcome::Ok,
        )?;
        let newly_registered = self
            .store
            .insert_activity_type_row(category.clone())
            .map_err(|e| storage_refused(OP, ctx, e))?;
        self.commit(entry)?;

        info!(
            operation = OP,
            caller = %ctx.caller,
            clock = ctx.clock.0,
            category = category.as_str(),
            newly_registered,
            "activity type registered"
        );
        Ok(())
    }

    pub fn deactivate_competition(
        &mut self,
        ctx: &CallContext,
        competition_id: CompetitionId,
    ) -> Result<(), LedgerError> {
        const OP: &str = "deactivate-competition";
        self.guard_clock(OP, ctx)?;
        validation::check_deactivate_competition(&self.config, &self.store, ctx, competition_id)
            .map_err(|r| refused(OP, ctx, r))?;

        let entry = self.stage(
            ctx,
            LedgerOperation::DeactivateCompetition { competition_id },
            OperationOutcome::Ok,
        )?;
        self.store
            .set_competition_operational_row(competition_id, false)
            .map_err(|e| storage_refused(OP, ctx, e))?;
        self.commit(entry)?;

        info!(
            operation = OP,
            caller = %ctx.caller,
            clock = ctx.clock.0,
            competition_id = competition_id.0,
            "competition deactivated"
        );
        Ok(())
    }

    fn guard_clock(&self, op: &'static str, ctx: &CallContext) -> Result<(), LedgerError> {
        if !self.config.enforce_clock_monotonicity {
            return Ok(());
        }
        match self.store.last_committed_clock() {
            Some(last) if ctx.clock < last => {
                debug!(operation = op, last = last.0, got = ctx.clock.0, "clock regression");
                Err(LedgerError::ClockRegression {
                    last: last.0,
                    got: ctx.clock.0,
                })
            }
            _ => Ok(()),
        }
    }

    fn stage(
        &self,
        ctx: &CallContext,
        operation: LedgerOperation,
        outcome: OperationOutcome,
    ) -> Result<JournalEntry, LedgerError> {
        let input = JournalEntryInput::v1(ctx.caller.clone(), ctx.clock, operation, outcome)?;
        Ok(self.store.stage_journal_row(input)?)
    }

    fn commit(&mut self, entry: JournalEntry) -> Result<(), LedgerError> {
        let clock = entry.clock;
        self.store.commit_journal_row(entry)?;
        self.store.note_committed_clock(clock);
        Ok(())
    }

    // ------------------------
    // Queries. Read committed state only.
    // ------------------------

    pub fn query_account_info(&self, principal: &Principal) -> Option<&AccountProfile> {
        self.store.account_row(principal)
    }

    pub fn fetch_activity_by_id(
        &self,
        activity_id: ActivityId,
        owner: &Principal,
    ) -> Option<&ActivityRecord> {
        self.store.activity_row(activity_id, owner)
    }

    pub fn fetch_competition_info(&self, competition_id: CompetitionId) -> Option<&Competition> {
        self.store.competition_row(competition_id)
    }

    pub fn check_competition_enrollment(
        &self,
        competition_id: CompetitionId,
        participant: &Principal,
    ) -> Option<&Enrollment> {
        self.store.enrollment_row(competition_id, participant)
    }

    pub fn is_registered_activity_type(&self, category: &ActivityCategory) -> bool {
        self.store.has_activity_type_row(category)
    }

    /// Ascending by activity id.
    pub fn list_activities_for(&self, owner: &Principal) -> Vec<&ActivityRecord> {
        self.store.activity_rows_for_owner(owner)
    }

    pub fn list_enrollments_for(&self, competition_id: CompetitionId) -> Vec<&Enrollment> {
        self.store.enrollment_rows_for_competition(competition_id)
    }

    pub fn competition_status(
        &self,
        competition_id: CompetitionId,
        at: ClockValue,
    ) -> Option<CompetitionStatus> {
        self.store
            .competition_row(competition_id)
            .map(|c| c.status_at(at))
    }

    pub fn last_activity_id(&self) -> u64 {
        self.store.last_activity_id()
    }

    pub fn last_competition_id(&self) -> u64 {
        self.store.last_competition_id()
    }

    pub fn journal(&self) -> &[JournalEntry] {
        self.store.journal_rows()
    }

    pub fn verify_journal(&self) -> Result<(), LedgerError> {
        Ok(self.store.verify_journal_rows()?)
    }
}

fn refused(op: &'static str, ctx: &CallContext, refusal: LedgerRefusal) -> LedgerError {
    debug!(
        operation = op,
        caller = %ctx.caller,
        clock = ctx.clock.0,
        reason_code = refusal.reason_code().0,
        "refused"
    );
    LedgerError::Refused(refusal)
}

fn storage_refused(op: &'static str, ctx: &CallContext, e: StorageError) -> LedgerError {
    match storage_to_ledger_error(e) {
        LedgerError::Refused(r) => refused(op, ctx, r),
        other => other,
    }
}
