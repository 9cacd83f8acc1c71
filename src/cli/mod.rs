//! CLI module for Planetary.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Planetary - conversational planning agent
///
/// Turns a goal like "plan a 3-day trip to Ooty" into a structured roadmap,
/// using a local language model and web search.
#[derive(Parser, Debug)]
#[command(name = "planetary")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate a plan for a goal
    Plan {
        /// What you want to plan, e.g. "learn DSA to crack interviews"
        query: String,

        /// Print the raw {"final_answer": ...} JSON
        #[arg(long)]
        json: bool,

        /// Save the plan as a roadmap
        #[arg(short, long)]
        save: bool,
    },

    /// List saved roadmaps
    List,

    /// Show a saved roadmap
    Show {
        /// Roadmap id
        id: String,
    },

    /// Delete a saved roadmap
    Delete {
        /// Roadmap id
        id: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Default tracing filter for the crate.
///
/// `-v` flags win over the configured `general.log_level`.
pub fn log_filter(verbose: u8, configured: &str) -> String {
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("planetary={}", level)
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "llm.model")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,
}
