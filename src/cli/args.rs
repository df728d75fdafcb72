//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

/// Uniload - load prebuilt packages into the running tool
///
/// Resolves, links and executes a set of packages from the local package
/// directory and prints what they export.
#[derive(Parser, Debug)]
#[command(name = "uniload")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "UNILOAD_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load packages and print their exports
    Load(LoadArgs),

    /// List packages in the package directory
    List(ListArgs),

    /// Show or edit configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the load command
#[derive(Parser, Debug)]
pub struct LoadArgs {
    /// Packages to load, as `name` or `name.slice`
    #[arg(required = true)]
    pub packages: Vec<String>,

    /// Package directory (defaults to config, then the data dir)
    #[arg(short, long, env = "UNILOAD_DIR")]
    pub dir: Option<PathBuf>,

    /// Release to load under (defaults to config, then "none")
    #[arg(long, env = "UNILOAD_RELEASE")]
    pub release: Option<String>,

    /// Check every dependency requirement, as when running from a checkout
    #[arg(long)]
    pub checkout: bool,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: LoadFormat,
}

/// Output format for the load command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LoadFormat {
    /// Package name to exports, as JSON
    Json,
    /// Package name and export keys, one package per line
    Plain,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Package directory (defaults to config, then the data dir)
    #[arg(short, long, env = "UNILOAD_DIR")]
    pub dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., loader.release)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Arguments for the completions command
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}

/// Output format for list command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
