//! Memory Archive — Progress Tracker.
//!
//! Owns the durable unlock ledger and the small preference records
//! (palette, boot flag). Storage failures never escape this crate: the
//! tracker falls back to an in-memory ledger.

pub mod application;
pub mod domain;
