#![forbid(unsafe_code)]

pub mod repo;
pub mod sequence;
pub mod store;
