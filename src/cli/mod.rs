//! CLI argument definitions for Carepath.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Carepath - Track care-pathway tasks in a spreadsheet.
///
/// Start with `carepath report` for progress, then `carepath edit` to update tasks.
#[derive(Parser, Debug)]
#[command(name = "carepath")]
#[command(author, version, about = "Track care-pathway task progress in a spreadsheet", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Tracking sheet to operate on (.xlsx or .csv).
    /// Can also be set via CAREPATH_FILE environment variable.
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,

    /// Local config file to read instead of ./carepath.kdl
    #[arg(long = "config", global = true, env = "CAREPATH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Filter flags shared by list, report, and export.
///
/// Omitting a flag keeps every value of that column.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep only these pathways (repeatable)
    #[arg(long = "pathway")]
    pub pathways: Vec<String>,

    /// Keep only these phases (repeatable)
    #[arg(long = "phase")]
    pub phases: Vec<String>,

    /// Keep only these statuses (repeatable)
    #[arg(long = "status")]
    pub statuses: Vec<String>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty tracking sheet with the standard header row
    Init {
        /// Header language: en or pt
        #[arg(long)]
        locale: Option<String>,

        /// Overwrite an existing sheet
        #[arg(long)]
        force: bool,
    },

    /// Show the pathway/phase/task choices the edit form offers
    ///
    /// Each level only offers values that exist under the levels above it.
    /// Unknown choices fall back to the first available value.
    Options {
        #[arg(long)]
        pathway: Option<String>,

        #[arg(long)]
        phase: Option<String>,

        #[arg(long)]
        task: Option<String>,
    },

    /// Set the status and note of one task
    Edit {
        #[arg(long)]
        pathway: String,

        #[arg(long)]
        phase: String,

        #[arg(long)]
        task: String,

        /// New status: pending, in-progress, done, ongoing (Portuguese labels accepted)
        #[arg(long)]
        status: String,

        /// Note to store with the task (cleared when status is done)
        #[arg(long)]
        note: Option<String>,
    },

    /// Add a pathway with every phase/task pair already in the sheet, all pending
    AddPathway {
        /// Name of the new pathway
        name: String,
    },

    /// List tasks matching the filters
    List {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Show completion per pathway and the status distribution
    Report {
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Write the filtered tasks as CSV
    Export {
        /// Output file (defaults to the configured export file name)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Serve the dashboard web page
    #[cfg(feature = "gui")]
    Serve {
        /// Port to listen on (0 picks a free port)
        #[arg(short, long, env = "CAREPATH_PORT")]
        port: Option<u16>,

        /// Host address to bind to
        #[arg(long, env = "CAREPATH_HOST")]
        host: Option<String>,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings and where each came from
    Show,
}
