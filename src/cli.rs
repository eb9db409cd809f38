//! Command-line interface definitions and parsing
//!
//! docr looks a term up with the adapter bound to a domain and either
//! prints the result (default) or opens an interactive pager.
//!
//! # Commands
//!
//! - (default) / `lookup`: resolve a term to documentation
//! - `adapters`: list the configured backend adapters
//! - `config`: get and set configuration values
//!
//! # Examples
//!
//! ```bash
//! # Look up a man page
//! docr printf
//!
//! # C++ domain, interactive pager
//! docr -d cpp -i sort
//!
//! # Force the blocking path and a fixed width
//! docr --sync -w 100 printf
//!
//! # Configuration
//! docr config set history_mode=separate
//! docr config get max_async_jobs
//! ```

use clap::{Args, Parser, Subcommand};

/// A fast documentation lookup and browsing tool for the command line
#[derive(Parser, Debug)]
#[command(name = "docr", version, about, args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Suppress informational output (only results)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub lookup: LookupArgs,
}

/// Arguments for a lookup, shared by the default invocation and the
/// explicit `lookup` subcommand
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Term to look up
    pub query: Option<String>,

    /// Domain key used to pick the backend adapter (e.g. a file type)
    #[arg(short, long, default_value = "")]
    pub domain: String,

    /// Formatting width; defaults to the terminal width
    #[arg(short, long)]
    pub width: Option<u16>,

    /// Browse interactively in a pager instead of printing
    #[arg(short, long)]
    pub interactive: bool,

    /// Disable asynchronous execution for this run
    #[arg(long)]
    pub sync: bool,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up documentation for a term
    #[command(visible_alias = "l")]
    Lookup {
        #[command(flatten)]
        args: LookupArgs,
    },

    /// List the configured backend adapters
    #[command(visible_alias = "a")]
    Adapters,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key=value (e.g. history_mode=separate)
        #[arg(value_name = "KEY=VALUE")]
        setting: String,
    },

    /// Get a configuration value
    Get {
        /// Configuration key to retrieve (e.g. history_mode)
        #[arg(value_name = "KEY")]
        key: String,
    },

    /// Print the path of the config file
    Path,
}

/// Split a `key=value` setting string
///
/// # Errors
///
/// Returns a message naming the expected shape when there is no `=` or
/// the key is empty.
pub fn split_setting(setting: &str) -> Result<(&str, &str), String> {
    match setting.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(format!(
            "expected KEY=VALUE (e.g. quiet=true), got '{setting}'"
        )),
    }
}
