//! Memory Archive — terminal player.
//!
//! Drives an [`Archive`](memarchive_orchestrator::application::archive::Archive)
//! from line-based controls, renders its effects as text and keeps
//! progress, preferences and the bookmark in a state directory.

pub mod bookmark;
pub mod config;
pub mod driver;
pub mod error;
pub mod input;
pub mod store;
pub mod terminal;
