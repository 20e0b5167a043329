//! Inventory index built from one account snapshot.
//!
//! The index owns every display-ready item in a single ordered list; the
//! lookup views (by instance id, by definition hash, by character, vault)
//! store positions into that list, so each item exists exactly once.

use crate::hash::DefinitionHash;
use crate::inventory::snapshot::{
    CharacterRecord, ItemComponent, ProfileSnapshot, SnapshotError, ITEM_STATE_LOCKED,
};
use crate::manifest::{
    BucketDefinition, ClassType, DamageType, ItemDefinition, ItemType, ManifestError,
    ManifestStore,
};
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Errors building an index
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Where an item currently is
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ItemLocation {
    Character { id: String, class: ClassType },
    Vault,
}

impl ItemLocation {
    pub fn character_id(&self) -> Option<&str> {
        match self {
            Self::Character { id, .. } => Some(id),
            Self::Vault => None,
        }
    }

    pub fn is_vault(&self) -> bool {
        matches!(self, Self::Vault)
    }
}

impl std::fmt::Display for ItemLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Character { id, class } => write!(f, "{} ({})", class, id),
            Self::Vault => write!(f, "vault"),
        }
    }
}

/// A character on the account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Character {
    pub id: String,
    pub class: ClassType,
    pub light: Option<i32>,
}

/// Display-ready item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryItem {
    pub hash: DefinitionHash,
    /// Only instanced (non-stacking) items have one
    pub instance_id: Option<String>,
    pub quantity: u32,
    pub bucket_hash: Option<DefinitionHash>,
    pub is_locked: bool,
    pub is_equipped: bool,
    pub can_equip: bool,
    pub name: String,
    pub tier: Option<String>,
    /// Display name of the item's bucket
    pub slot: Option<String>,
    pub item_type: ItemType,
    pub item_sub_type: i32,
    pub class_restriction: ClassType,
    pub power: Option<i32>,
    pub damage_type: Option<DamageType>,
    pub energy_capacity: Option<i32>,
    pub energy_used: Option<i32>,
    pub location: ItemLocation,
    /// Plug hashes, present only when the sockets component was fetched
    pub perks: Option<Vec<DefinitionHash>>,
}

impl InventoryItem {
    pub fn is_instanced(&self) -> bool {
        self.instance_id.is_some()
    }
}

/// Multi-keyed view over one snapshot's items
#[derive(Debug, Clone, Default)]
pub struct InventoryIndex {
    items: Vec<InventoryItem>,
    characters: IndexMap<String, Character>,
    by_instance_id: HashMap<String, usize>,
    by_hash: IndexMap<DefinitionHash, Vec<usize>>,
    by_character: IndexMap<String, Vec<usize>>,
    vault: Vec<usize>,
}

impl InventoryIndex {
    /// Every item, in snapshot order
    pub fn all(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.get(id)
    }

    pub fn by_instance_id(&self, instance_id: &str) -> Option<&InventoryItem> {
        self.by_instance_id.get(instance_id).map(|&i| &self.items[i])
    }

    pub fn instance_count(&self) -> usize {
        self.by_instance_id.len()
    }

    /// Items sharing a definition, first-seen first
    pub fn by_hash(&self, hash: impl Into<DefinitionHash>) -> Vec<&InventoryItem> {
        self.resolve(self.by_hash.get(&hash.into()))
    }

    /// Distinct definition hashes, first-seen order
    pub fn hashes(&self) -> impl Iterator<Item = DefinitionHash> + '_ {
        self.by_hash.keys().copied()
    }

    /// Items on one character (vault excluded)
    pub fn by_character(&self, character_id: &str) -> Vec<&InventoryItem> {
        self.resolve(self.by_character.get(character_id))
    }

    pub fn character_ids(&self) -> impl Iterator<Item = &str> {
        self.by_character.keys().map(String::as_str)
    }

    pub fn vault_items(&self) -> Vec<&InventoryItem> {
        self.resolve(Some(&self.vault))
    }

    fn resolve(&self, positions: Option<&Vec<usize>>) -> Vec<&InventoryItem> {
        positions
            .map(|p| p.iter().map(|&i| &self.items[i]).collect())
            .unwrap_or_default()
    }

    /// Definitions held more than once as instanced items, first-seen order.
    /// The first item of each list is the canonical copy.
    pub fn duplicates(&self) -> Vec<(DefinitionHash, Vec<&InventoryItem>)> {
        self.by_hash
            .iter()
            .filter_map(|(hash, positions)| {
                let copies: Vec<&InventoryItem> = positions
                    .iter()
                    .map(|&i| &self.items[i])
                    .filter(|item| item.is_instanced())
                    .collect();
                (copies.len() > 1).then_some((*hash, copies))
            })
            .collect()
    }

    fn push(&mut self, item: InventoryItem) {
        if let Some(instance_id) = &item.instance_id {
            if self.by_instance_id.contains_key(instance_id) {
                warn!(instance_id = %instance_id, "Duplicate instance id in snapshot, keeping first");
                return;
            }
        }

        let position = self.items.len();
        if let Some(instance_id) = &item.instance_id {
            self.by_instance_id.insert(instance_id.clone(), position);
        }
        self.by_hash.entry(item.hash).or_default().push(position);
        match &item.location {
            ItemLocation::Character { id, .. } => {
                self.by_character.entry(id.clone()).or_default().push(position)
            }
            ItemLocation::Vault => self.vault.push(position),
        }
        self.items.push(item);
    }
}

/// Highest-power item; on ties the earliest item wins
pub fn highest_power<'a>(
    items: impl IntoIterator<Item = &'a InventoryItem>,
) -> Option<&'a InventoryItem> {
    items.into_iter().fold(None, |best, item| match best {
        Some(current) if item.power.unwrap_or(i32::MIN) <= current.power.unwrap_or(i32::MIN) => {
            Some(current)
        }
        _ => Some(item),
    })
}

/// Definition lookups memoized for one build
struct Resolver<'a> {
    store: &'a ManifestStore,
    items: HashMap<DefinitionHash, Option<ItemDefinition>>,
    buckets: HashMap<DefinitionHash, Option<BucketDefinition>>,
}

impl<'a> Resolver<'a> {
    fn new(store: &'a ManifestStore) -> Self {
        Self {
            store,
            items: HashMap::new(),
            buckets: HashMap::new(),
        }
    }

    fn item(&mut self, hash: DefinitionHash) -> Result<Option<ItemDefinition>, ManifestError> {
        if let Some(cached) = self.items.get(&hash) {
            return Ok(cached.clone());
        }
        let def = self.store.lookup_item(hash)?;
        self.items.insert(hash, def.clone());
        Ok(def)
    }

    fn bucket_name(&mut self, hash: DefinitionHash) -> Result<Option<String>, ManifestError> {
        if let Some(cached) = self.buckets.get(&hash) {
            return Ok(cached.as_ref().map(|b| b.name.clone()));
        }
        let def = self.store.lookup_bucket(hash)?;
        let name = def.as_ref().map(|b| b.name.clone());
        self.buckets.insert(hash, def);
        Ok(name)
    }
}

/// Build the index for one snapshot.
///
/// Character items come first (equipment, then inventory, per character in
/// snapshot order), followed by vault items. Items whose definition is not in
/// the manifest are dropped with a warning. A snapshot without a characters
/// component is an inventory-less account and yields an empty index.
pub fn build_inventory_index(
    snapshot: &ProfileSnapshot,
    store: &ManifestStore,
) -> Result<InventoryIndex, InventoryError> {
    if !snapshot.has_characters() {
        debug!("Snapshot has no characters component; index is empty");
        return Ok(InventoryIndex::default());
    }

    let mut index = InventoryIndex::default();
    let mut resolver = Resolver::new(store);
    let with_perks = snapshot.has_sockets();
    let mut dropped = 0usize;

    for (id, record) in snapshot.characters() {
        let character = character_from_record(id, record);
        let location = ItemLocation::Character {
            id: character.id.clone(),
            class: character.class,
        };
        index.by_character.entry(character.id.clone()).or_default();
        index.characters.insert(character.id.clone(), character);

        for (raw, equipped_slot) in snapshot
            .equipment(id)
            .iter()
            .map(|raw| (raw, true))
            .chain(snapshot.inventory(id).iter().map(|raw| (raw, false)))
        {
            match make_item(snapshot, &mut resolver, raw, location.clone(), equipped_slot, with_perks)? {
                Some(item) => index.push(item),
                None => dropped += 1,
            }
        }
    }

    for raw in snapshot.vault() {
        match make_item(snapshot, &mut resolver, raw, ItemLocation::Vault, false, with_perks)? {
            Some(item) => index.push(item),
            None => dropped += 1,
        }
    }

    debug!(
        items = index.len(),
        characters = index.characters.len(),
        dropped,
        "Built inventory index"
    );
    Ok(index)
}

fn character_from_record(id: &str, record: &CharacterRecord) -> Character {
    Character {
        id: record.character_id.clone().unwrap_or_else(|| id.to_string()),
        class: ClassType::from_code(record.class_type),
        light: record.light,
    }
}

fn make_item(
    snapshot: &ProfileSnapshot,
    resolver: &mut Resolver<'_>,
    raw: &ItemComponent,
    location: ItemLocation,
    from_equipment: bool,
    with_perks: bool,
) -> Result<Option<InventoryItem>, ManifestError> {
    let Some(hash) = DefinitionHash::from_i64(raw.item_hash) else {
        warn!(item_hash = raw.item_hash, "Dropping item with out-of-range hash");
        return Ok(None);
    };
    let Some(def) = resolver.item(hash)? else {
        warn!(hash = %hash, location = %location, "Dropping item with unknown definition");
        return Ok(None);
    };

    let bucket_hash = raw
        .bucket_hash
        .and_then(DefinitionHash::from_i64)
        .or(def.bucket_hash);
    let slot = match bucket_hash {
        Some(bucket) => resolver.bucket_name(bucket)?,
        None => None,
    };

    let instance_id = raw.item_instance_id.clone().filter(|id| !id.is_empty());
    let instance = instance_id.as_deref().and_then(|id| snapshot.instance(id));
    let perks = match (&instance_id, with_perks) {
        (Some(id), true) => snapshot.sockets(id).map(|sockets| {
            sockets
                .sockets
                .iter()
                .filter(|s| s.is_enabled)
                .filter_map(|s| s.plug_hash.and_then(DefinitionHash::from_i64))
                .filter(|h| h.get() != 0)
                .collect()
        }),
        _ => None,
    };

    Ok(Some(InventoryItem {
        hash,
        quantity: raw.quantity,
        bucket_hash,
        is_locked: raw.state & ITEM_STATE_LOCKED != 0,
        is_equipped: instance.map_or(from_equipment, |i| i.is_equipped),
        can_equip: instance.is_some_and(|i| i.can_equip),
        name: def.name,
        tier: def.tier_type_name,
        slot,
        item_type: def.item_type,
        item_sub_type: def.item_sub_type,
        class_restriction: def.class_type,
        power: instance.and_then(|i| i.primary_stat.as_ref()).map(|s| s.value),
        damage_type: instance
            .map(|i| DamageType::from_code(i.damage_type))
            .filter(|d| *d != DamageType::None),
        energy_capacity: instance.and_then(|i| i.energy.as_ref()).map(|e| e.energy_capacity),
        energy_used: instance.and_then(|i| i.energy.as_ref()).map(|e| e.energy_used),
        location,
        perks,
        instance_id,
    }))
}
