//! CLI commands and argument parsing

use clap::{Parser, Subcommand};

/// PayPal reporting facade CLI
#[derive(Parser, Debug)]
#[command(name = "paypal-facade")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP facade
    Serve {
        /// Port to listen on (overrides PORT from the environment)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Test the configured credentials with a token round trip
    Check,
}
