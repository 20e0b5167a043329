//! Roll discovery: which weapons can roll a perk combination

use anyhow::{bail, Result};
use std::path::Path;
use vaultkeep::perks::{parse_roll_expression, resolve_perk_groups};

use super::open_loaded_store;

pub fn handle(cache_dir: Option<&Path>, expression: &str, archetype: Option<&str>) -> Result<()> {
    let names = parse_roll_expression(expression)?;
    // An empty group list would match every weapon
    if names.is_empty() {
        bail!("No perks requested; pass an expression like \"outlaw + rampage\"");
    }

    let store = open_loaded_store(cache_dir)?;
    let groups = resolve_perk_groups(&names, &store)?;
    let weapons = store.find_weapons_by_perk_groups(&groups, archetype)?;

    if weapons.is_empty() {
        println!("No weapons can roll {}", expression);
        return Ok(());
    }
    for weapon in &weapons {
        println!(
            "{:>10}  {:<32} {:<16} {}",
            weapon.hash,
            weapon.name,
            weapon.archetype.as_deref().unwrap_or("-"),
            weapon.tier_type_name.as_deref().unwrap_or("-")
        );
    }
    println!("{} weapon(s)", weapons.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_expression_is_rejected_before_opening_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        let err = handle(Some(dir.path()), "   ", None).unwrap_err();
        assert!(err.to_string().contains("No perks requested"));
        assert!(!dir.path().join(vaultkeep::manifest::CACHE_FILE).exists());
    }
}
