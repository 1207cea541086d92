#![forbid(unsafe_code)]

//! Rebuilds a ledger from its operation journal.

use thiserror::Error;
use tracing::{debug, info};

use stride_kernel_contracts::journal::JournalEntry;
use stride_storage::store::{verify_journal_chain, StorageError};

use crate::config::LedgerWiringConfig;
use crate::context::CallContext;
use crate::engine::{LedgerEngine, LedgerError};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("journal entry {entry_id} failed to re-apply: {source}")]
    Ledger { entry_id: u64, source: LedgerError },
    #[error("journal rejected: {0}")]
    Storage(#[from] StorageError),
    #[error("journal entry {entry_id} re-applied with a different outcome")]
    OutcomeMismatch { entry_id: u64 },
    #[error("journal is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Re-executes every entry under its recorded caller and clock.
///
/// The chain is verified first. Each re-applied entry must reproduce the recorded
/// outcome and entry hash, so the rebuilt journal is identical to `entries`.
pub fn replay_journal(
    config: LedgerWiringConfig,
    entries: &[JournalEntry],
) -> Result<LedgerEngine, ReplayError> {
    verify_journal_chain(entries)?;
    let mut engine = LedgerEngine::new_in_memory(config).map_err(|source| ReplayError::Ledger {
        entry_id: 0,
        source,
    })?;

    for entry in entries {
        let ctx = CallContext::new(entry.caller.clone(), entry.clock);
        let outcome = engine
            .apply(&ctx, entry.operation.clone())
            .map_err(|source| ReplayError::Ledger {
                entry_id: entry.entry_id.0,
                source,
            })?;
        let rebuilt_hash = engine.journal().last().map(|e| e.entry_hash.as_str());
        if outcome != entry.outcome || rebuilt_hash != Some(entry.entry_hash.as_str()) {
            debug!(entry_id = entry.entry_id.0, "replay diverged");
            return Err(ReplayError::OutcomeMismatch {
                entry_id: entry.entry_id.0,
            });
        }
    }

    info!(entries = entries.len(), "journal replayed");
    Ok(engine)
}

pub fn journal_to_json(entries: &[JournalEntry]) -> Result<String, ReplayError> {
    Ok(serde_json::to_string_pretty(entries)?)
}

pub fn journal_from_json(raw: &str) -> Result<Vec<JournalEntry>, ReplayError> {
    Ok(serde_json::from_str(raw)?)
}
