//! CLI argument parsing via clap.

use bookvault::build_info::LONG_VERSION;
use bookvault::services::files::ImportFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for a BookVault server.
#[derive(Debug, Parser)]
#[command(name = "bookvault", version, long_version = LONG_VERSION)]
pub struct Args {
    /// Path to config file (default: ./bookvault.toml or ~/.config/bookvault/bookvault.toml).
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<String>,

    /// Override API base URL.
    #[arg(long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Print raw JSON instead of the summary view.
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Check whether the server is reachable.
    Status,
    /// Write the default config to ~/.config/bookvault/bookvault.toml.
    Init,
    /// Create an account.
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
    /// Confirm an account with the emailed code.
    Verify {
        #[arg(long)]
        email: String,
        #[arg(long)]
        code: String,
    },
    /// Log in and store the session.
    Login {
        /// Account email. Prompted for when omitted.
        #[arg(long)]
        email: Option<String>,
    },
    /// Revoke the stored tokens and forget the session.
    Logout,
    /// Show who the stored session belongs to.
    Whoami,
    /// Exchange the refresh token for a new access token now.
    Refresh,
    /// Manage the book shelf.
    #[command(subcommand)]
    Books(BooksCommand),
    /// List stored files or import a library export.
    #[command(subcommand)]
    Files(FilesCommand),
    /// Search OpenLibrary by ISBN.
    Lookup { isbn: String },
    /// Send an authenticated GET and print the body.
    Get { path: String },
    /// Show or change local preferences.
    #[command(subcommand)]
    Prefs(PrefsCommand),
}

#[derive(Debug, Subcommand)]
pub enum BooksCommand {
    /// List shelf entries.
    List {
        /// Reading status filter (e.g. READ, CURRENTLY_READING).
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        page: Option<u32>,
    },
    /// Add a book.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        isbn: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Reading status to shelve under.
        #[arg(long)]
        status: Option<String>,
    },
    /// Remove a shelf entry.
    Remove { id: String },
    /// Reading statistics.
    Stats,
    /// Progress toward this year's reading goal.
    Goal,
}

#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    List,
    /// Upload a CSV export for import into the library.
    Upload {
        path: PathBuf,
        /// Export layout: csv or goodreads.
        #[arg(long = "type", default_value = "csv")]
        format: ImportFormat,
        /// Import books already on the shelf again.
        #[arg(long)]
        allow_duplicates: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum PrefsCommand {
    Show,
    /// Set one preference, e.g. `prefs set reading_goal 24`.
    Set { key: String, value: String },
}
