//! Memory Archive — orchestration.
//!
//! Composes the Progress Tracker, Narration Sequencer and Escalation Timer
//! behind the Scene Navigator and the Dock Multiplexer, and exposes the whole
//! core as the [`application::archive::Archive`] facade.

pub mod application;
pub mod config;
pub mod domain;
