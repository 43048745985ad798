//! Shared types for parlor: game identifiers, the per-round state machine phases,
//! player decisions, presentation events, outcome tables, and the persisted records.

pub mod casino;
pub mod store;
