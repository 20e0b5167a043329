//! Inventory command CLI definitions

use clap::Subcommand;
use std::path::PathBuf;

/// Output format for inventory search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Subcommand)]
pub enum InventoryCommand {
    /// Filter a snapshot's items with a query (e.g. is:weapon tier:exotic)
    Search {
        /// Profile snapshot JSON
        snapshot: PathBuf,

        /// Query terms; all must match
        query: Vec<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// List instanced items held more than once
    Duplicates {
        /// Profile snapshot JSON
        snapshot: PathBuf,
    },
}
