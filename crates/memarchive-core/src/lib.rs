//! Memarchive Core — shared abstractions.
//!
//! This crate defines the identifiers, the presentation effect vocabulary,
//! the cooperative scheduler and the collaborator traits that every
//! component depends on. It contains no presentation or storage code.

pub mod clock;
pub mod command;
pub mod error;
pub mod event;
pub mod ids;
pub mod media;
pub mod schedule;
pub mod store;
pub mod surface;
