//! Command handlers for the vk CLI
//!
//! Each subcommand has its own module with handler functions.

pub mod components;
pub mod configure;
pub mod inventory;
pub mod manifest;
pub mod rolls;

use anyhow::{bail, Context, Result};
use std::path::Path;
use vaultkeep::ManifestStore;

use crate::config::Config;

/// Open the manifest cache, honoring a `--cache-dir` override
pub fn open_store(cache_dir: Option<&Path>) -> Result<ManifestStore> {
    let dir = Config::load()?.manifest_dir(cache_dir)?;
    ManifestStore::open(&dir)
        .with_context(|| format!("Failed to open manifest cache at {}", dir.display()))
}

/// Open the cache and require that a manifest has been loaded into it
pub fn open_loaded_store(cache_dir: Option<&Path>) -> Result<ManifestStore> {
    let store = open_store(cache_dir)?;
    if store.cached_version()?.is_none() {
        bail!("Manifest cache is empty; run `vk manifest load` first");
    }
    Ok(store)
}
