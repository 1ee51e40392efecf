//! Subcommand implementations.

pub mod config;
pub mod list_rules;
pub mod output;
pub mod reports;
pub mod review;
