//! Scripts, timing and session state.

pub mod script;
pub mod session;
