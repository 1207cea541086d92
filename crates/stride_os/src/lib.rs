#![forbid(unsafe_code)]

pub mod config;
pub mod context;
pub mod engine;
pub mod replay;
pub mod shared;
pub mod validation;

pub use config::{LedgerWiringConfig, ValidationProfile};
pub use context::CallContext;
pub use engine::{LedgerEngine, LedgerError};
pub use shared::SharedLedger;
