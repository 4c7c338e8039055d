//! Command implementations

pub mod prune;
