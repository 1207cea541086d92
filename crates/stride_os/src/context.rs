#![forbid(unsafe_code)]

use stride_kernel_contracts::{ClockValue, Principal};

/// Implicit context of every call: the authenticated caller and the clock value
/// assigned to the call by the ordering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Principal,
    pub clock: ClockValue,
}

impl CallContext {
    pub fn new(caller: Principal, clock: ClockValue) -> Self {
        Self { caller, clock }
    }
}
