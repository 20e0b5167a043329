//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::inventory::InventoryCommand;
use super::manifest::ManifestCommand;

#[derive(Parser)]
#[command(name = "vk")]
#[command(about = "Inventory companion: manifest cache, inventory search, roll lookup", long_about = None)]
pub struct Cli {
    /// Manifest cache directory (overrides the configured one)
    #[arg(long, global = true, env = "VAULTKEEP_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Set the default manifest cache directory
        #[arg(long = "set-cache-dir")]
        set_cache_dir: Option<PathBuf>,

        /// Set the manifest language
        #[arg(long)]
        language: Option<String>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },

    /// Manifest cache operations (load, info, lookups)
    #[command(visible_alias = "m")]
    Manifest {
        #[command(subcommand)]
        command: ManifestCommand,
    },

    /// Search and analyze an account snapshot
    #[command(visible_alias = "i")]
    Inventory {
        #[command(subcommand)]
        command: InventoryCommand,
    },

    /// Find weapons that can roll a perk combination
    #[command(visible_alias = "r")]
    Rolls {
        /// Perk names: `+` between groups, `|` between alternatives
        /// (e.g. "outlaw + rampage | kill clip")
        expression: String,

        /// Only weapons whose archetype contains this text
        #[arg(short, long)]
        archetype: Option<String>,
    },

    /// Print the profile component codes a snapshot fetch must request
    Components {
        /// Include item sockets (needed for perk data)
        #[arg(long)]
        perks: bool,
    },
}
