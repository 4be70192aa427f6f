use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pensive", bin_name = "pensive", version)]
#[command(about = "Tag-centric knowledge organizer for the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to $PENSIVE_DATA, then the OS data directory)
    #[arg(long, global = true, value_name = "DIR", help_heading = "Options")]
    pub data: Option<PathBuf>,

    /// Verbose output (debug logs on stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage tags
    #[command(display_order = 1)]
    Tag {
        #[command(subcommand)]
        action: TagCommands,
    },

    /// Show everything filed under a tag, one category (A) or one entry (B3)
    #[command(alias = "s", display_order = 2)]
    Show {
        tag: String,
        selector: Option<String>,

        /// Do not open the attachment of a format 2 entry
        #[arg(long)]
        no_open: bool,
    },

    /// Edit a note (A), add a titled entry (B) or edit one (B3)
    #[command(alias = "e", display_order = 3)]
    Edit {
        tag: String,
        selector: String,

        /// Add the tag without asking if it does not exist
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Remove a note (A) or a titled entry (B3)
    #[command(alias = "rm", display_order = 4)]
    Remove {
        tag: String,
        selector: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Move a note (A) or entry (B3) to another category (C) or tag (C@tag)
    #[command(display_order = 5)]
    Mv {
        tag: String,
        source: String,
        target: String,

        /// Create a missing target tag without asking
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Search every category
    #[command(display_order = 6)]
    Search { pattern: String },

    /// Manage categories
    #[command(alias = "cat", display_order = 7)]
    Category {
        #[command(subcommand)]
        action: CategoryCommands,
    },

    /// Copy the store to the backup directory
    #[command(display_order = 10)]
    Backup {
        /// Backup name (defaults to the current unix time)
        name: Option<String>,
    },

    /// List backups, or restore backup N
    #[command(display_order = 11)]
    Restore {
        index: Option<usize>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Write every tag to a plain text file
    #[command(display_order = 12)]
    Export,

    /// Create the store if it does not exist yet
    #[command(display_order = 13)]
    Init,
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Add one or more tags
    Add {
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,
    },

    /// Remove tags and everything filed under them
    Rm {
        #[arg(required = true, num_args = 1..)]
        tags: Vec<String>,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Rename a tag in every category
    Mv { old: String, new: String },

    /// List tags, optionally matching a pattern (`*` matches any run)
    Ls { pattern: Option<String> },
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommands {
    /// List categories with their letters and formats
    Show,

    /// Add a category bound to a format
    Add {
        name: String,

        /// 0 single note, 1 titled notes, 2 titled notes with attachment
        #[arg(value_parser = clap::value_parser!(u8).range(0..=2))]
        format: u8,
    },

    /// Remove a category and all its entries
    Rm {
        name: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Rename a category
    Mv { old: String, new: String },
}
