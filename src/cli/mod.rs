//! CLI module for AEGIS.
//!
//! Provides command-line parsing and handling for the aegis-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

/// Project scaffolding (`aegis-server init`).
pub mod init;
/// Colored terminal output helpers.
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A.E.G.I.S - Auth & Entitlement Gateway for Identity Services
#[derive(Parser, Debug)]
#[command(
    name = "aegis-server",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "A.E.G.I.S - Auth & Entitlement Gateway for Identity Services",
    long_about = "A credential-issuance and request-authorization server: Argon2id password\n\
                  hashing, HS256 access/refresh token pairs, role-gated routes, and an\n\
                  optional federated identity bridge.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a new deployment.",
    after_help = "EXAMPLES:\n    \
                  aegis-server init              # Scaffold a new AEGIS deployment\n    \
                  aegis-server                   # Start the server (requires aegis.toml)\n    \
                  aegis-server --config my.toml  # Use a custom config file\n    \
                  aegis-server config --validate # Check the config and its env vars"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "aegis.toml", global = true)]
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
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new AEGIS deployment with configuration files
    ///
    /// Creates aegis.toml, .env.example, .gitignore, and the data directory.
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file and its env vars
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
