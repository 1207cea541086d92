#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

use crate::{ContractViolation, Validate};

pub const PRINCIPAL_MAX_LEN: usize = 128;

// Reserved for identities owned by the ledger itself. No principal carrying it can
// be constructed, whether directly or through deserialization.
const RESERVED_PREFIX: char = '@';

/// Authenticated caller identity, injected by the serving layer per request and
/// treated as an opaque, already-verified key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Result<Self, ContractViolation> {
        let id = id.into();
        validate_external_principal(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_external_principal(id: &str) -> Result<(), ContractViolation> {
    if id.trim().is_empty() {
        return Err(ContractViolation::InvalidValue {
            field: "principal",
            reason: "must not be empty",
        });
    }
    if id.len() > PRINCIPAL_MAX_LEN {
        return Err(ContractViolation::InvalidValue {
            field: "principal",
            reason: "must be <= 128 chars",
        });
    }
    if id.starts_with(RESERVED_PREFIX) {
        return Err(ContractViolation::InvalidValue {
            field: "principal",
            reason: "reserved prefix",
        });
    }
    Ok(())
}

impl Validate for Principal {
    fn validate(&self) -> Result<(), ContractViolation> {
        validate_external_principal(&self.0)
    }
}

impl TryFrom<String> for Principal {
    type Error = ContractViolation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(p: Principal) -> Self {
        p.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
