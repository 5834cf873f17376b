//! CLI argument parsing for Knowtree.

use clap::{Parser, Subcommand, ValueEnum};
use knowtree::ExportFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "knowtree",
    about = "A hierarchy of knowledge categories backed by SQLite",
    version = env!("GIT_DESCRIBE"),
    after_help = "Logs are written to: ~/.local/share/knowtree/logs/knowtree.log"
)]
pub struct Cli {
    /// Path to the SQLite database (overrides the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Path to a YAML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create the database if it does not exist
    Init,

    /// Add a category
    Add {
        /// Category name
        name: String,

        /// Description
        #[arg(short = 'D', long)]
        description: Option<String>,

        /// Parent category ID (omit for a root)
        #[arg(short, long)]
        parent: Option<i64>,
    },

    /// Show a category by ID
    Get {
        /// Category ID
        id: i64,
    },

    /// Change a category's name and/or description
    Edit {
        /// Category ID
        id: i64,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New description (empty string clears it)
        #[arg(short = 'D', long)]
        description: Option<String>,
    },

    /// Delete a category and its direct subcategories
    Delete {
        /// Category ID
        id: i64,

        /// Delete the whole subtree instead of one level
        #[arg(short, long)]
        recursive: bool,
    },

    /// List root categories, or the children of a category
    List {
        /// Parent category ID
        #[arg(short, long)]
        parent: Option<i64>,

        /// List every category
        #[arg(short, long, conflicts_with = "parent")]
        all: bool,
    },

    /// Print the hierarchy below a category (all roots by default)
    Tree {
        /// Category ID
        id: Option<i64>,

        /// Stop expanding below this many levels
        #[arg(short, long)]
        max_level: Option<usize>,

        /// Print the nested tree as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the path from the root to a category
    Path {
        /// Category ID
        id: i64,

        /// Leave the category itself out of the path
        #[arg(long)]
        exclude_self: bool,
    },

    /// List every descendant of a category
    Descendants {
        /// Category ID
        id: i64,
    },

    /// Show subtree statistics for a category
    Stats {
        /// Category ID
        id: i64,
    },

    /// Find a category by name (case-insensitive)
    Find {
        /// Name to look for
        name: String,

        /// Only search below this category
        #[arg(short, long)]
        parent: Option<i64>,
    },

    /// Check whether one category is an ancestor of another
    Ancestor {
        /// Category ID
        id: i64,

        /// Potential ancestor ID
        ancestor_id: i64,
    },

    /// Export a category's subtree to a text file
    Export {
        /// Category ID
        id: i64,

        /// Output file
        file: PathBuf,

        /// Output layout (defaults to the configured format)
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },
}

/// Export layout as accepted on the command line.
#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Report,
    Outline,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Report => ExportFormat::Report,
            FormatArg::Outline => ExportFormat::Outline,
        }
    }
}
