//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up vk defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
pub fn handle(cache_dir: Option<PathBuf>, language: Option<String>, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config)?;
        return Ok(());
    }

    if !apply(&mut config, cache_dir, language) {
        show_usage();
        return Ok(());
    }

    let path = config.save()?;
    println!("Config saved to: {}", path.display());
    Ok(())
}

/// Apply requested changes; false when nothing was requested
fn apply(config: &mut Config, cache_dir: Option<PathBuf>, language: Option<String>) -> bool {
    let mut changed = false;
    if let Some(dir) = cache_dir {
        println!("Manifest cache directory: {}", dir.display());
        config.cache_dir = Some(dir);
        changed = true;
    }
    if let Some(language) = language {
        println!("Manifest language: {}", language);
        config.language = Some(language);
        changed = true;
    }
    changed
}

fn show_config(config: &Config) -> Result<()> {
    println!("Manifest cache: {}", config.manifest_dir(None)?.display());
    println!("Language:       {}", config.language());

    if let Ok(path) = Config::config_path() {
        println!("Config file:    {}", path.display());
    }

    Ok(())
}

fn show_usage() {
    println!("Usage: vk configure --set-cache-dir DIR");
    println!("   or: vk configure --language LANG");
    println!("   or: vk configure --show");
}
