#![forbid(unsafe_code)]

use std::sync::Arc;

use parking_lot::RwLock;

use stride_kernel_contracts::account::DisplayName;
use stride_kernel_contracts::activity::{ActivityCategory, ActivityId, ActivitySubmission};
use stride_kernel_contracts::competition::{CompetitionId, CompetitionLaunch};
use stride_kernel_contracts::journal::{LedgerOperation, OperationOutcome};
use stride_storage::repo::LedgerRepo;
use stride_storage::store::LedgerStore;

use crate::context::CallContext;
use crate::engine::{LedgerEngine, LedgerError};

/// Thread-safe handle over one ledger.
///
/// Writers serialize on the write lock and mutate copy-on-write. Readers take a
/// committed snapshot and query it without holding any lock, so a long read never
/// stalls a writer and never observes a half-applied call.
///
/// With clock monotonicity enforced, clock values must be assigned in the same
/// order writers acquire the lock. A call stamped `t` that reaches the lock after
/// a call stamped `t + 1` fails with `LedgerError::ClockRegression`. Stamp the
/// clock inside [`SharedLedger::write`] when callers race.
#[derive(Debug)]
pub struct SharedLedger<S = LedgerStore> {
    inner: Arc<RwLock<Arc<LedgerEngine<S>>>>,
}

impl<S> Clone for SharedLedger<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: LedgerRepo + Clone> SharedLedger<S> {
    pub fn new(engine: LedgerEngine<S>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(engine))),
        }
    }

    pub fn snapshot(&self) -> Arc<LedgerEngine<S>> {
        Arc::clone(&self.inner.read())
    }

    /// Runs `f` as the only writer. Outstanding snapshots keep the state they saw.
    pub fn write<T>(&self, f: impl FnOnce(&mut LedgerEngine<S>) -> T) -> T {
        let mut guard = self.inner.write();
        f(Arc::make_mut(&mut guard))
    }

    pub fn execute(
        &self,
        ctx: &CallContext,
        operation: LedgerOperation,
    ) -> Result<OperationOutcome, LedgerError> {
        self.write(|e| e.apply(ctx, operation))
    }

    pub fn setup_account(
        &self,
        ctx: &CallContext,
        display_name: DisplayName,
    ) -> Result<(), LedgerError> {
        self.write(|e| e.setup_account(ctx, display_name))
    }

    pub fn submit_activity(
        &self,
        ctx: &CallContext,
        submission: ActivitySubmission,
    ) -> Result<ActivityId, LedgerError> {
        self.write(|e| e.submit_activity(ctx, submission))
    }

    pub fn launch_competition(
        &self,
        ctx: &CallContext,
        launch: CompetitionLaunch,
    ) -> Result<CompetitionId, LedgerError> {
        self.write(|e| e.launch_competition(ctx, launch))
    }

    pub fn enroll_in_competition(
        &self,
        ctx: &CallContext,
        competition_id: CompetitionId,
    ) -> Result<(), LedgerError> {
        self.write(|e| e.enroll_in_competition(ctx, competition_id))
    }

    pub fn register_activity_type(
        &self,
        ctx: &CallContext,
        category: ActivityCategory,
    ) -> Result<(), LedgerError> {
        self.write(|e| e.register_activity_type(ctx, category))
    }

    pub fn deactivate_competition(
        &self,
        ctx: &CallContext,
        competition_id: CompetitionId,
    ) -> Result<(), LedgerError> {
        self.write(|e| e.deactivate_competition(ctx, competition_id))
    }
}
