//! Inventory command handlers
//!
//! Both commands index a saved profile snapshot against the manifest cache.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::warn;
use vaultkeep::{
    build_inventory_index, highest_power, parse_query, DefinitionHash, InventoryIndex,
    InventoryItem, ProfileSnapshot,
};

use super::open_loaded_store;
use crate::cli::OutputFormat;

pub fn read_snapshot(path: &Path) -> Result<ProfileSnapshot> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    ProfileSnapshot::from_json_slice(&bytes)
        .with_context(|| format!("Invalid snapshot {}", path.display()))
}

/// Rejoin shell arguments into query text, re-quoting arguments that the
/// shell already unquoted
pub fn join_terms(terms: &[String]) -> String {
    terms
        .iter()
        .map(|term| {
            if term.contains(char::is_whitespace) && !term.contains('"') {
                format!("\"{}\"", term)
            } else {
                term.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn search(
    cache_dir: Option<&Path>,
    snapshot_path: &Path,
    terms: &[String],
    format: OutputFormat,
) -> Result<()> {
    let store = open_loaded_store(cache_dir)?;
    let snapshot = read_snapshot(snapshot_path)?;

    let mut query = parse_query(&join_terms(terms))?;
    if query.uses_perks() {
        if !snapshot.has_sockets() {
            warn!("Snapshot has no socket data; perk terms will match nothing");
        }
        query.resolve_perks(&store)?;
    }

    let index = build_inventory_index(&snapshot, &store)?;
    let items = query.filter(&index);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Table => {
            println!("{}", table_header());
            println!("{}", "-".repeat(table_header().len()));
            for item in &items {
                println!("{}", table_row(item));
            }
            println!("{} of {} item(s)", items.len(), index.len());
        }
    }
    Ok(())
}

fn table_header() -> String {
    format!(
        "{:<32} {:<10} {:<20} {:>5} {:<24} {}",
        "name", "tier", "slot", "power", "location", "flags"
    )
}

fn table_row(item: &InventoryItem) -> String {
    let mut flags = String::new();
    if item.is_equipped {
        flags.push('E');
    }
    if item.is_locked {
        flags.push('L');
    }
    if item.quantity > 1 {
        flags.push_str(&format!("x{}", item.quantity));
    }

    format!(
        "{:<32} {:<10} {:<20} {:>5} {:<24} {}",
        truncate(&item.name, 32),
        item.tier.as_deref().unwrap_or("-"),
        truncate(item.slot.as_deref().unwrap_or("-"), 20),
        item.power.map(|p| p.to_string()).unwrap_or_default(),
        item.location.to_string(),
        flags
    )
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// One definition held several times: the copy to keep and the rest
pub struct DuplicateGroup<'a> {
    pub hash: DefinitionHash,
    pub keep: &'a InventoryItem,
    pub extras: Vec<&'a InventoryItem>,
}

/// Keep the highest-power copy of each duplicate; ties keep the first seen
pub fn plan_duplicates(index: &InventoryIndex) -> Vec<DuplicateGroup<'_>> {
    index
        .duplicates()
        .into_iter()
        .filter_map(|(hash, copies)| {
            let keep = highest_power(copies.iter().copied())?;
            let extras = copies
                .into_iter()
                .filter(|item| !std::ptr::eq(*item, keep))
                .collect();
            Some(DuplicateGroup { hash, keep, extras })
        })
        .collect()
}

pub fn duplicates(cache_dir: Option<&Path>, snapshot_path: &Path) -> Result<()> {
    let store = open_loaded_store(cache_dir)?;
    let snapshot = read_snapshot(snapshot_path)?;
    let index = build_inventory_index(&snapshot, &store)?;

    let groups = plan_duplicates(&index);
    if groups.is_empty() {
        println!("No duplicates");
        return Ok(());
    }

    for group in &groups {
        println!("{} [{}]", group.keep.name, group.hash);
        println!("  keep  {}", describe_copy(group.keep));
        for extra in &group.extras {
            println!("  extra {}", describe_copy(extra));
        }
    }
    let extras: usize = groups.iter().map(|g| g.extras.len()).sum();
    println!("{} duplicated item(s), {} extra copies", groups.len(), extras);
    Ok(())
}

fn describe_copy(item: &InventoryItem) -> String {
    format!(
        "{} power {} in {}{}",
        item.instance_id.as_deref().unwrap_or("-"),
        item.power.map(|p| p.to_string()).unwrap_or_else(|| "?".to_string()),
        item.location,
        if item.is_locked { " (locked)" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vaultkeep::manifest::{DefinitionKind, ManifestRow};
    use vaultkeep::{ManifestDump, ManifestStore};

    fn index() -> InventoryIndex {
        let store = ManifestStore::open_in_memory().unwrap();
        store
            .rebuild(
                "v1",
                &ManifestDump::from_rows(vec![ManifestRow {
                    hash: DefinitionHash::new(1001),
                    kind: DefinitionKind::Item,
                    record: json!({
                        "displayProperties": {"name": "Ace of Spades"},
                        "inventory": {"tierTypeName": "Exotic"},
                        "itemType": 3
                    }),
                }]),
            )
            .unwrap();
        let snapshot = ProfileSnapshot::from_value(json!({
            "characters": {"data": {"c1": {"classType": 1}}},
            "characterInventories": {"data": {"c1": {"items": [
                {"itemHash": 1001, "itemInstanceId": "a"},
                {"itemHash": 1001, "itemInstanceId": "b"},
                {"itemHash": 1001, "itemInstanceId": "c"}
            ]}}},
            "itemComponents": {"instances": {"data": {
                "a": {"primaryStat": {"value": 1800}},
                "b": {"primaryStat": {"value": 1810}},
                "c": {"primaryStat": {"value": 1810}}
            }}}
        }))
        .unwrap();
        build_inventory_index(&snapshot, &store).unwrap()
    }

    #[test]
    fn test_plan_duplicates_keeps_first_highest() {
        let index = index();
        let groups = plan_duplicates(&index);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keep.instance_id.as_deref(), Some("b"));
        let extras: Vec<&str> = groups[0]
            .extras
            .iter()
            .filter_map(|i| i.instance_id.as_deref())
            .collect();
        assert_eq!(extras, vec!["a", "c"]);
    }

    #[test]
    fn test_join_terms_requotes_phrases() {
        let terms = vec!["is:weapon".to_string(), "ace of spades".to_string()];
        assert_eq!(join_terms(&terms), "is:weapon \"ace of spades\"");
        let query = parse_query(&join_terms(&terms)).unwrap();
        assert_eq!(query.filter(&index()).len(), 3);
    }

    #[test]
    fn test_table_row() {
        let index = index();
        let row = table_row(&index.all()[1]);
        assert!(row.starts_with("Ace of Spades"));
        assert!(row.contains("Exotic"));
        assert!(row.contains("1810"));
        assert!(row.contains("hunter (c1)"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Celestial Nighthawk", 10), "Celestial…");
    }

    #[test]
    fn test_read_snapshot_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.json");
        assert!(read_snapshot(&path).is_err());

        std::fs::write(&path, r#"{"characters": {"data": [1]}}"#).unwrap();
        assert!(read_snapshot(&path).is_err());

        std::fs::write(&path, r#"{"Response": {}}"#).unwrap();
        assert!(read_snapshot(&path).is_ok());
    }
}
