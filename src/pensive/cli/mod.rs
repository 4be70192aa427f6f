//! The `pensive` command line client.

mod commands;
mod render;
mod setup;

pub use commands::run;
