#![forbid(unsafe_code)]

/// Monotonic id source for one entity kind.
///
/// Starts at zero, so the first id handed out is 1. Allocation is two-phase: callers
/// `peek_next` while staging a write and `commit` once the write lands, which keeps
/// the counter inside the same atomic unit as the record it numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceCounter {
    current: u64,
}

impl SequenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn peek_next(&self) -> u64 {
        self.current.saturating_add(1)
    }

    /// Advances to `allocated`. Never moves backwards.
    pub fn commit(&mut self, allocated: u64) {
        self.current = self.current.max(allocated);
    }
}
