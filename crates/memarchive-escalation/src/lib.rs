//! Memory Archive — Escalation Timer.
//!
//! A two-stage delayed chain (warning, then blackout and reveal) that can be
//! armed, disarmed before it becomes visible, and only undone by a full
//! reset once it has.

pub mod application;
pub mod domain;
