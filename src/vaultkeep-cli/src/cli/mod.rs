//! CLI argument definitions for vk
//!
//! This module contains all clap-derived structs and enums for CLI parsing.

mod core;
mod inventory;
mod manifest;

pub use core::{Cli, Commands};
pub use inventory::{InventoryCommand, OutputFormat};
pub use manifest::ManifestCommand;
