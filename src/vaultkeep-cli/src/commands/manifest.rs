//! Manifest cache command handlers

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use vaultkeep::{
    manifest::BucketDefinition, DefinitionHash, ItemDefinition, ManifestDump, ManifestStore,
    PerkDefinition,
};

use super::{open_loaded_store, open_store};
use crate::config::Config;

/// Dump files are either given directly or picked by language from a directory
pub fn resolve_dump_path(path: &Path, language: &str) -> PathBuf {
    if path.is_dir() {
        path.join(format!("{}.json", language))
    } else {
        path.to_path_buf()
    }
}

pub fn read_dump(path: &Path) -> Result<ManifestDump> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read manifest dump {}", path.display()))?;
    ManifestDump::from_json_slice(&bytes)
        .with_context(|| format!("Failed to parse manifest dump {}", path.display()))
}

pub fn load(cache_dir: Option<&Path>, version: &str, dump: &Path, force: bool) -> Result<()> {
    let config = Config::load()?;
    let store = open_store(cache_dir)?;
    let path = resolve_dump_path(dump, config.language());

    if force {
        store.rebuild(version, &read_dump(&path)?)?;
        println!("Rebuilt manifest cache at version {}", version);
    } else if store.sync(version, || read_dump(&path))? {
        println!("Loaded manifest version {}", version);
    } else {
        println!("Manifest version {} is already cached", version);
    }

    print_stats(&store)
}

pub fn info(cache_dir: Option<&Path>) -> Result<()> {
    let store = open_store(cache_dir)?;
    println!(
        "Cache:   {}",
        Config::load()?.manifest_dir(cache_dir)?.display()
    );
    print_stats(&store)
}

fn print_stats(store: &ManifestStore) -> Result<()> {
    let stats = store.stats()?;
    println!(
        "Version: {}",
        stats.version.as_deref().unwrap_or("(not loaded)")
    );
    println!("Items:   {}", stats.item_count);
    println!("Weapons: {}", stats.weapon_count);
    println!("Perks:   {}", stats.perk_count);
    println!("Buckets: {}", stats.bucket_count);
    Ok(())
}

pub fn item(cache_dir: Option<&Path>, hash: DefinitionHash) -> Result<()> {
    let store = open_loaded_store(cache_dir)?;
    match store.lookup_item(hash)? {
        Some(def) => print!("{}", describe_item(&def)),
        None => println!("No item definition with hash {}", hash),
    }
    Ok(())
}

pub fn bucket(cache_dir: Option<&Path>, hash: DefinitionHash) -> Result<()> {
    let store = open_loaded_store(cache_dir)?;
    match store.lookup_bucket(hash)? {
        Some(def) => print!("{}", describe_bucket(&def)),
        None => println!("No bucket definition with hash {}", hash),
    }
    Ok(())
}

pub fn perk(cache_dir: Option<&Path>, hash: DefinitionHash) -> Result<()> {
    let store = open_loaded_store(cache_dir)?;
    match store.lookup_perk(hash)? {
        Some(def) => print!("{}", describe_perk(&def)),
        None => println!("No perk definition with hash {}", hash),
    }
    Ok(())
}

pub fn search(cache_dir: Option<&Path>, text: &str, perks_only: bool) -> Result<()> {
    let store = open_loaded_store(cache_dir)?;

    let rows: Vec<(DefinitionHash, String, String)> = if perks_only {
        store
            .search_perks(text)?
            .into_iter()
            .map(|p| (p.hash, p.name, p.plug_category))
            .collect()
    } else {
        store
            .search_items(text)?
            .into_iter()
            .map(|i| {
                let label = i.tier_type_name.unwrap_or_else(|| i.item_type.to_string());
                (i.hash, i.name, label)
            })
            .collect()
    };

    if rows.is_empty() {
        println!("No definitions match {:?}", text);
        return Ok(());
    }
    for (hash, name, label) in &rows {
        println!("{:>10}  {:<40} {}", hash, name, label);
    }
    println!("{} match(es)", rows.len());
    Ok(())
}

fn describe_item(def: &ItemDefinition) -> String {
    let mut out = format!("{} [{}]\n", def.name, def.hash);
    if let Some(tier) = &def.tier_type_name {
        out.push_str(&format!("  Tier:      {}\n", tier));
    }
    out.push_str(&format!("  Type:      {}", def.item_type));
    if let Some(archetype) = &def.archetype {
        out.push_str(&format!(" ({})", archetype));
    }
    out.push('\n');
    out.push_str(&format!("  Class:     {}\n", def.class_type));
    if let Some(bucket) = def.bucket_hash {
        out.push_str(&format!("  Bucket:    {}\n", bucket));
    }
    if def.max_stack_size > 1 {
        out.push_str(&format!("  Stacks to: {}\n", def.max_stack_size));
    }
    if let Some(category) = &def.plug_category {
        out.push_str(&format!("  Plug:      {}\n", category));
    }
    if !def.description.is_empty() {
        out.push_str(&format!("  {}\n", def.description));
    }
    out
}

fn describe_bucket(def: &BucketDefinition) -> String {
    format!("{} [{}]\n  Category: {}\n", def.name, def.hash, def.category)
}

fn describe_perk(def: &PerkDefinition) -> String {
    let mut out = format!("{} [{}]\n  Category: {}\n", def.name, def.hash, def.plug_category);
    if !def.description.is_empty() {
        out.push_str(&format!("  {}\n", def.description));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultkeep::{ClassType, ItemType};

    #[test]
    fn test_resolve_dump_path() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(resolve_dump_path(dir.path(), "de"), dir.path().join("de.json"));

        let file = dir.path().join("dump.json");
        std::fs::write(&file, "{}").unwrap();
        assert_eq!(resolve_dump_path(&file, "de"), file);
    }

    #[test]
    fn test_read_dump() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("en.json");
        std::fs::write(
            &file,
            r#"{"DestinyInventoryItemDefinition": {"1001": {"displayProperties": {"name": "Ace of Spades"}}}}"#,
        )
        .unwrap();

        let dump = read_dump(&file).unwrap();
        assert_eq!(dump.len(), 1);

        assert!(read_dump(&dir.path().join("missing.json")).is_err());
        std::fs::write(&file, "not json").unwrap();
        assert!(read_dump(&file).is_err());
    }

    #[test]
    fn test_describe_item() {
        let def = ItemDefinition {
            hash: DefinitionHash::new(1001),
            name: "Ace of Spades".to_string(),
            description: String::new(),
            icon: None,
            tier_type_name: Some("Exotic".to_string()),
            item_type: ItemType::Weapon,
            item_sub_type: 0,
            class_type: ClassType::Any,
            bucket_hash: None,
            max_stack_size: 1,
            non_transferrable: false,
            equippable: true,
            archetype: Some("Hand Cannon".to_string()),
            plug_category: None,
        };
        let text = describe_item(&def);
        assert!(text.starts_with("Ace of Spades [1001]\n"));
        assert!(text.contains("Tier:      Exotic"));
        assert!(text.contains("(Hand Cannon)"));
        assert!(!text.contains("Stacks to"));
    }
}
