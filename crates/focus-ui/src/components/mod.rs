//! Reusable line builders shared by the views.

pub mod header;
pub mod usage_bar;
