//! Orchestration services and the archive facade.

pub mod archive;
pub mod multiplexer;
pub mod navigator;
pub mod stage;

#[cfg(test)]
pub(crate) mod fixture;
