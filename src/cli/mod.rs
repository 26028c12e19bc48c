//! Command handlers and terminal UI

pub mod alert;
pub mod app;
pub mod fetch;
pub mod rate;
pub mod setup;
pub mod symbols;
pub mod ui;
pub mod worker;
