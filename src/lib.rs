//! Picks the least practiced words from a vocabulary spreadsheet.
//!
//! The binary in main.rs is a thin shell over these modules: `sheet` reads
//! the rows, `engine` ranks and summarizes them, and `session` runs the
//! pipeline off the interface thread and reports back through `event`.

pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod session;
pub mod sheet;
pub mod ui;
