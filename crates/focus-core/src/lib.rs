//! Core types for focus360.
//!
//! Domain models, the error type, the installed-app filter, formatting and
//! timezone helpers, and CLI settings shared by the other crates.

pub mod calculations;
pub mod error;
pub mod filters;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
