//! CLI module for the account server
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// account-server - user accounts with RS256 bearer-token login
#[derive(Parser, Debug)]
#[command(
    name = "account-server",
    version,
    about = "User account service: registration, login and profile management",
    long_about = "Serves the account HTTP API. Run without arguments to start the server.",
    after_help = "EXAMPLES:\n    \
                  account-server                            # Start the server (reads account.toml)\n    \
                  account-server --config prod.toml         # Use a custom config file\n    \
                  account-server config --validate          # Check the configuration and key files\n    \
                  account-server hash-password 'Secret#1'   # Print a bcrypt hash\n    \
                  account-server openapi > openapi.json     # Dump the OpenAPI document"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "account.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Show configuration information
    Config {
        /// Validate the configuration and read the key files
        #[arg(long)]
        validate: bool,
    },

    /// Hash a password with the configured bcrypt cost
    HashPassword {
        /// Plaintext password
        password: String,
    },

    /// Print the OpenAPI document as JSON
    Openapi,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
