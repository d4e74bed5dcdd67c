//! Terminal front end: one module per command plus shared table helpers.

pub mod analytics;
pub mod list;
pub mod remind;
pub mod setup;
pub mod ui;
