//! Data layer for focus360.
//!
//! Reads device snapshots, filters and aggregates usage into per-app daily
//! summaries, ranks apps, resolves icons and stores per-app controls.

pub mod aggregator;
pub mod analysis;
pub mod controls;
pub mod ranking;
pub mod reader;

pub use focus_core as core;
