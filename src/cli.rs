//! CLI definitions for MindMeld.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use mindmeld_protocols::ProfileKey;

/// MindMeld CLI.
#[derive(Parser)]
#[command(name = "mindmeld")]
#[command(about = "Rewrite the readable text of web pages through a local language model")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.mindmeld/config.toml)
    #[arg(short, long, global = true, env = "MINDMELD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also write logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Rewrite the article text of an HTML page
    Rewrite {
        /// Input HTML file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Profile to use instead of the stored preference (calm, clarity, energize)
        #[arg(short, long)]
        profile: Option<ProfileKey>,

        /// Colour theme to apply after rewriting
        #[arg(short, long)]
        theme: Option<String>,
    },

    /// Put back every rewritten element of a page
    Restore {
        /// Input HTML file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the plain text of a page
    Extract {
        /// Input HTML file
        input: PathBuf,
    },

    /// Compare two or three pages through the model
    Compare {
        /// HTML files to compare
        #[arg(required = true, num_args = 2..=3)]
        pages: Vec<PathBuf>,
    },

    /// Answer JSON-lines requests on stdin against one page
    Serve {
        /// Input HTML file
        input: PathBuf,

        /// Where to write the page once stdin closes
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the built-in instruction profiles
    Prompts,

    /// List the colour themes
    Themes,

    /// Preference management commands
    Prefs {
        #[command(subcommand)]
        action: PrefsAction,
    },
}

#[derive(Subcommand)]
pub(crate) enum PrefsAction {
    /// Show one preference, or all of them as JSON
    Get {
        /// Preference key (simplificationLevel, optimizeFor, fontEnabled)
        key: Option<String>,
    },

    /// Store a preference
    Set {
        /// Preference key
        key: String,

        /// New value
        value: String,
    },
}
