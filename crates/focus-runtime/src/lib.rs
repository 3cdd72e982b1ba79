//! Runtime layer for focus360.
//!
//! Caches usage reports behind the usage-access gate and refreshes them from
//! a background tokio task.

pub mod data_manager;
pub mod orchestrator;

pub use focus_core as core;
pub use focus_data as data;
