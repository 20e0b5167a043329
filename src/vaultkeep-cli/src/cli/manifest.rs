//! Manifest command CLI definitions

use clap::Subcommand;
use std::path::PathBuf;
use vaultkeep::DefinitionHash;

#[derive(Subcommand)]
pub enum ManifestCommand {
    /// Load a manifest dump into the cache
    Load {
        /// Version token of the dump
        #[arg(long)]
        version: String,

        /// Dump file, or a directory holding one `<language>.json` per language
        dump: PathBuf,

        /// Rebuild even when the cache already holds this version
        #[arg(short, long)]
        force: bool,
    },

    /// Show cache version and counts
    Info,

    /// Look up an item definition (signed or unsigned hash)
    Item {
        #[arg(allow_hyphen_values = true)]
        hash: DefinitionHash,
    },

    /// Look up a bucket definition
    Bucket {
        #[arg(allow_hyphen_values = true)]
        hash: DefinitionHash,
    },

    /// Look up a perk definition
    Perk {
        #[arg(allow_hyphen_values = true)]
        hash: DefinitionHash,
    },

    /// Search item definitions by name
    Search {
        /// Case-insensitive name fragment
        text: String,

        /// Only list perks
        #[arg(short, long)]
        perks: bool,
    },
}
