//! CLI module
//!
//! Command-line interface for the facade.
//!
//! # Commands
//!
//! - `serve` - Start the HTTP facade
//! - `check` - Test the configured credentials

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
