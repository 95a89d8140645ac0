pub mod toml_config;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "profile-relay")]
#[command(about = "Track coding-platform usernames and show their public profile stats")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "profile-relay.toml")]
    pub config: String,

    /// Directory holding saved usernames (overrides storage.path)
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Save a username and show the platform's profiles
    Add { platform: String, username: String },
    /// Forget a saved username
    Remove { platform: String, username: String },
    /// List saved usernames with their profile links
    List { platform: Option<String> },
    /// Fetch and display profile stats
    Show {
        platform: Option<String>,
        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(feature = "cli")]
impl Command {
    /// Whether the command rewrites the saved usernames.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Command::Add { .. } | Command::Remove { .. })
    }
}
