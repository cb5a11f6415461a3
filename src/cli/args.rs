//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::NodeKind;

/// Ordered folder/document outline with fractional order keys
#[derive(Parser, Debug)]
#[command(name = "kbtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Debug output, repeat for more (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .kbtree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    /// Outline file (default: `outline` setting)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a key sorting strictly between two keys
    Key {
        /// Lower bound (open if omitted)
        #[arg(short, long)]
        before: Option<String>,
        /// Upper bound (open if omitted)
        #[arg(short, long)]
        after: Option<String>,
    },

    /// Show the outline as a tree
    Tree {
        /// Annotate entries with their order keys
        #[arg(short, long)]
        keys: bool,
    },

    /// List one sibling group in order
    List {
        /// Parent folder id (top level if omitted)
        parent: Option<String>,
    },

    /// Validate ids, keys and parent links
    Check,

    /// Append a folder or document to a sibling group
    Add {
        /// Display name
        name: String,
        /// folder or doc
        #[arg(short, long, default_value = "doc")]
        kind: NodeKind,
        /// Parent folder id (top level if omitted)
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Move a node between two of its siblings
    Move {
        /// Node to move
        id: String,
        /// Sibling that ends up directly before the node
        #[arg(short, long)]
        before: Option<String>,
        /// Sibling that ends up directly after the node
        #[arg(short, long)]
        after: Option<String>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Write a config template
    Init {
        /// Create the global config instead of the project one
        #[arg(short, long)]
        global: bool,
    },
}
