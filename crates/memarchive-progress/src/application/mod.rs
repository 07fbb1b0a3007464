//! Stateful services over the persisted records.

pub mod preferences;
pub mod tracker;
