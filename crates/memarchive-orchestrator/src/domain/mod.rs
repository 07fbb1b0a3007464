//! Orchestration domain: controls, scene table, dock state and tasks.

pub mod commands;
pub mod dock;
pub mod scene_table;
pub mod task;
