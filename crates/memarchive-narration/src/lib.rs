//! Memory Archive — Narration Sequencer.
//!
//! Plays one narration script at a time on the single narrator surface:
//! segments are revealed character by character, held, then separated by a
//! gap. Starting a new script or stopping always tears the previous session
//! down before anything else is written.

pub mod application;
pub mod domain;
