//! CLI subcommands.

pub mod config;
pub mod hint;
pub mod play;
