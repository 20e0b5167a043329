//! Perk-group matching for roll discovery.
//!
//! A roll request is a list of groups. Each group holds the perk hashes the
//! caller accepts in that position (a partial name can match several perks),
//! and a weapon matches when its perk pool hits every group.
//!
//! Roll expressions use `+` between groups and `|` between alternatives:
//! `outlaw + rampage | kill clip` asks for Outlaw together with either
//! Rampage or Kill Clip.

use crate::hash::DefinitionHash;
use crate::manifest::{ManifestError, ManifestStore, WeaponDefinition};
use indexmap::IndexSet;
use tracing::debug;

/// Groups of alternative perk hashes
pub type PerkGroups = Vec<Vec<DefinitionHash>>;

/// Errors resolving roll expressions
#[derive(Debug, thiserror::Error)]
pub enum PerkError {
    #[error("Empty perk group in roll expression: {0:?}")]
    EmptyGroup(String),

    #[error("No perks match {}", .0.join(" | "))]
    UnresolvedGroup(Vec<String>),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Keep the weapons whose perk pool intersects every group.
///
/// `archetype` narrows by case-insensitive substring of the weapon's
/// archetype label. Input order is preserved. An empty `groups` list matches
/// every weapon; callers that want "no perks requested" to mean "no results"
/// must check for that themselves.
pub fn match_weapons(
    weapons: impl IntoIterator<Item = WeaponDefinition>,
    groups: &[Vec<DefinitionHash>],
    archetype: Option<&str>,
) -> Vec<WeaponDefinition> {
    let archetype = archetype.map(str::to_lowercase);
    weapons
        .into_iter()
        .filter(|weapon| groups.iter().all(|group| weapon.has_any_perk(group)))
        .filter(|weapon| match &archetype {
            Some(wanted) => weapon
                .archetype
                .as_deref()
                .is_some_and(|label| label.to_lowercase().contains(wanted.as_str())),
            None => true,
        })
        .collect()
}

/// Split a roll expression into name groups.
///
/// Whitespace around names is trimmed. An empty group or alternative
/// (`"a + + b"`, `"a |"`) is an error naming the expression.
pub fn parse_roll_expression(expression: &str) -> Result<Vec<Vec<String>>, PerkError> {
    if expression.trim().is_empty() {
        return Ok(Vec::new());
    }

    expression
        .split('+')
        .map(|group| {
            let names: Vec<String> = group.split('|').map(|n| n.trim().to_string()).collect();
            if names.iter().any(String::is_empty) {
                Err(PerkError::EmptyGroup(expression.to_string()))
            } else {
                Ok(names)
            }
        })
        .collect()
}

/// Resolve name groups into hash groups using the store's perk search.
///
/// Each alternative expands to every perk whose name contains it. A group in
/// which no alternative resolves fails with [`PerkError::UnresolvedGroup`]
/// rather than silently widening the match.
pub fn resolve_perk_groups(
    names: &[Vec<String>],
    store: &ManifestStore,
) -> Result<PerkGroups, PerkError> {
    let mut groups = Vec::with_capacity(names.len());
    for group in names {
        let mut hashes = IndexSet::new();
        for name in group {
            let found = store.search_perks(name)?;
            debug!(name = %name, matches = found.len(), "Resolved perk name");
            hashes.extend(found.into_iter().map(|perk| perk.hash));
        }
        if hashes.is_empty() {
            return Err(PerkError::UnresolvedGroup(group.clone()));
        }
        groups.push(hashes.into_iter().collect());
    }
    Ok(groups)
}

/// Parse, resolve and match a roll expression in one step
pub fn find_rolls(
    store: &ManifestStore,
    expression: &str,
    archetype: Option<&str>,
) -> Result<Vec<WeaponDefinition>, PerkError> {
    let names = parse_roll_expression(expression)?;
    let groups = resolve_perk_groups(&names, store)?;
    Ok(store.find_weapons_by_perk_groups(&groups, archetype)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{DefinitionKind, ManifestDump, ManifestRow};
    use serde_json::json;

    const A: u32 = 1;
    const B: u32 = 2;
    const C: u32 = 3;

    fn h(value: u32) -> DefinitionHash {
        DefinitionHash::new(value)
    }

    fn weapon(hash: u32, archetype: &str, perks: &[u32]) -> WeaponDefinition {
        WeaponDefinition {
            hash: h(hash),
            name: format!("Weapon {}", hash),
            archetype: Some(archetype.to_string()),
            tier_type_name: Some("Legendary".to_string()),
            perk_hashes: perks.iter().copied().map(h).collect(),
        }
    }

    fn universe() -> Vec<WeaponDefinition> {
        vec![
            weapon(100, "Hand Cannon", &[A, B]),
            weapon(101, "Hand Cannon", &[A]),
            weapon(102, "Scout Rifle", &[B, C]),
            weapon(103, "Sidearm", &[]),
        ]
    }

    fn hashes(weapons: &[WeaponDefinition]) -> Vec<u32> {
        weapons.iter().map(|w| w.hash.get()).collect()
    }

    #[test]
    fn test_groups_are_and_ed() {
        let found = match_weapons(universe(), &[vec![h(A)], vec![h(B)]], None);
        assert_eq!(hashes(&found), vec![100]);
    }

    #[test]
    fn test_alternatives_are_or_ed() {
        let found = match_weapons(universe(), &[vec![h(A), h(B)]], None);
        assert_eq!(hashes(&found), vec![100, 101, 102]);
    }

    #[test]
    fn test_empty_groups_match_everything() {
        let found = match_weapons(universe(), &[], None);
        assert_eq!(hashes(&found), vec![100, 101, 102, 103]);
    }

    #[test]
    fn test_empty_inner_group_matches_nothing() {
        let found = match_weapons(universe(), &[vec![]], None);
        assert!(found.is_empty());
    }

    #[test]
    fn test_archetype_filter_is_case_insensitive_substring() {
        let found = match_weapons(universe(), &[vec![h(B)]], Some("SCOUT"));
        assert_eq!(hashes(&found), vec![102]);

        let found = match_weapons(universe(), &[], Some("cannon"));
        assert_eq!(hashes(&found), vec![100, 101]);
    }

    #[test]
    fn test_archetype_filter_skips_unlabelled_weapons() {
        let mut unlabelled = weapon(104, "", &[A]);
        unlabelled.archetype = None;
        let found = match_weapons(vec![unlabelled], &[], Some("cannon"));
        assert!(found.is_empty());
    }

    #[test]
    fn test_parse_roll_expression() {
        let groups = parse_roll_expression("outlaw + rampage | kill clip").unwrap();
        assert_eq!(
            groups,
            vec![
                vec!["outlaw".to_string()],
                vec!["rampage".to_string(), "kill clip".to_string()],
            ]
        );
        assert!(parse_roll_expression("   ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_roll_expression_rejects_empty_parts() {
        assert!(matches!(
            parse_roll_expression("outlaw + + rampage"),
            Err(PerkError::EmptyGroup(_))
        ));
        assert!(matches!(
            parse_roll_expression("outlaw |"),
            Err(PerkError::EmptyGroup(_))
        ));
    }

    fn perk_store() -> ManifestStore {
        let plug = |hash: u32, name: &str| ManifestRow {
            hash: h(hash),
            kind: DefinitionKind::Item,
            record: json!({
                "displayProperties": {"name": name},
                "itemType": 19,
                "plug": {"plugCategoryIdentifier": "frames"}
            }),
        };
        let gun = |hash: u32, archetype: &str, perks: &[u32]| ManifestRow {
            hash: h(hash),
            kind: DefinitionKind::Item,
            record: json!({
                "displayProperties": {"name": format!("Gun {}", hash)},
                "itemTypeDisplayName": archetype,
                "itemType": 3,
                "sockets": {"socketEntries": [{
                    "reusablePlugItems": perks.iter().map(|p| json!({"plugItemHash": p})).collect::<Vec<_>>()
                }]}
            }),
        };
        let store = ManifestStore::open_in_memory().unwrap();
        store
            .rebuild(
                "test",
                &ManifestDump::from_rows(vec![
                    plug(A, "Outlaw"),
                    plug(B, "Rampage"),
                    plug(C, "Kill Clip"),
                    plug(4, "Rampage Spec"),
                    gun(100, "Hand Cannon", &[A, B]),
                    gun(101, "Hand Cannon", &[A, C]),
                    gun(102, "Scout Rifle", &[4]),
                ]),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_resolve_perk_groups_expands_partial_names() {
        let store = perk_store();
        let names = parse_roll_expression("outlaw + rampage").unwrap();
        let groups = resolve_perk_groups(&names, &store).unwrap();
        assert_eq!(groups, vec![vec![h(A)], vec![h(B), h(4)]]);
    }

    #[test]
    fn test_resolve_perk_groups_reports_unresolved() {
        let store = perk_store();
        let names = parse_roll_expression("outlaw + firefly").unwrap();
        let err = resolve_perk_groups(&names, &store).unwrap_err();
        assert!(matches!(err, PerkError::UnresolvedGroup(ref g) if g == &["firefly".to_string()]));
    }

    #[test]
    fn test_find_rolls() {
        let store = perk_store();
        let found = find_rolls(&store, "outlaw + rampage | kill clip", None).unwrap();
        assert_eq!(hashes(&found), vec![100, 101]);

        let found = find_rolls(&store, "rampage", Some("scout")).unwrap();
        assert_eq!(hashes(&found), vec![102]);
    }
}
