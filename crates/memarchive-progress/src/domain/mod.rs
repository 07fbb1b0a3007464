//! Ledger and storage key types.

pub mod keys;
pub mod ledger;
