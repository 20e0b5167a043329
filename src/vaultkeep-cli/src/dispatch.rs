//! Command dispatch functions
//!
//! Breaks up the main match statement into focused dispatch functions.

use std::path::Path;

use anyhow::Result;

use crate::cli::*;
use crate::commands;

/// Dispatch manifest subcommands
pub fn dispatch_manifest(cache_dir: Option<&Path>, command: ManifestCommand) -> Result<()> {
    match command {
        ManifestCommand::Load {
            version,
            dump,
            force,
        } => commands::manifest::load(cache_dir, &version, &dump, force),

        ManifestCommand::Info => commands::manifest::info(cache_dir),

        ManifestCommand::Item { hash } => commands::manifest::item(cache_dir, hash),

        ManifestCommand::Bucket { hash } => commands::manifest::bucket(cache_dir, hash),

        ManifestCommand::Perk { hash } => commands::manifest::perk(cache_dir, hash),

        ManifestCommand::Search { text, perks } => {
            commands::manifest::search(cache_dir, &text, perks)
        }
    }
}

/// Dispatch inventory subcommands
pub fn dispatch_inventory(cache_dir: Option<&Path>, command: InventoryCommand) -> Result<()> {
    match command {
        InventoryCommand::Search {
            snapshot,
            query,
            format,
        } => commands::inventory::search(cache_dir, &snapshot, &query, format),

        InventoryCommand::Duplicates { snapshot } => {
            commands::inventory::duplicates(cache_dir, &snapshot)
        }
    }
}
