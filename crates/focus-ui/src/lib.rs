//! Terminal UI layer for focus360.
//!
//! Themes, bar and header components, the app list, most-used ranking,
//! app detail and permission screens, and the event loop tying them to the
//! refresh runtime, built on [`ratatui`].

pub mod app;
pub mod components;
pub mod detail_view;
pub mod permission_view;
pub mod table_view;
pub mod themes;

pub use focus_core as core;
