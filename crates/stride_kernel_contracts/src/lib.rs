#![forbid(unsafe_code)]

pub mod account;
pub mod activity;
pub mod common;
pub mod competition;
pub mod enrollment;
pub mod identity;
pub mod journal;
pub mod refusal;

pub use common::{ClockValue, ContractViolation, ReasonCodeId, SchemaVersion, Validate};
pub use identity::Principal;
pub use refusal::LedgerRefusal;
