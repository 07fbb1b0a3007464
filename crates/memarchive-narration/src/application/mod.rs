//! The sequencer service.

pub mod sequencer;
