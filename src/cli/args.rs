//! CLI argument definitions using clap
//!
//! Commands:
//! - courseql query "<sentence>"
//! - courseql explain "<sentence>"
//! - courseql add --id <id> --archive <file.zip> [--kind courses]
//! - courseql remove --id <id>
//! - courseql list
//! - courseql serve
//!
//! Every command accepts `--config <path>`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// courseql - English-sentence queries over course datasets
#[derive(Parser, Debug)]
#[command(name = "courseql")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, global = true, default_value = "./courseql.json")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Run a single query and print its records
    Query {
        /// Query sentence, e.g. "In courses dataset abc, find all entries; show Title."
        text: String,
    },

    /// Show how a query parses without running it
    Explain {
        /// Query sentence
        text: String,
    },

    /// Import a zip or tar archive as a new dataset
    Add {
        /// Dataset id
        #[arg(long)]
        id: String,

        /// Path to the zip or tar archive
        #[arg(long)]
        archive: PathBuf,

        /// Dataset kind
        #[arg(long, default_value = "courses")]
        kind: String,
    },

    /// Remove a stored dataset
    Remove {
        /// Dataset id
        #[arg(long)]
        id: String,
    },

    /// List stored datasets
    List,

    /// Read JSON requests from stdin, one per line
    Serve,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
