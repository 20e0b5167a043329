//! Manifest dump input.
//!
//! The remote content endpoint publishes one JSON object per language, keyed
//! by definition table name, each table mapping hash strings to records.
//! [`ManifestDump`] keeps the rows of the tables this crate cares about in
//! the order they appear, and [`compile`] turns them into the typed rows the
//! store persists.

use crate::hash::DefinitionHash;
use crate::manifest::types::*;
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use tracing::warn;

/// Definition kinds mirrored into the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Item,
    Bucket,
    PlugSet,
}

impl DefinitionKind {
    pub const ALL: &'static [DefinitionKind] =
        &[DefinitionKind::Item, DefinitionKind::Bucket, DefinitionKind::PlugSet];

    /// Table name used by the remote content dump
    pub fn table_name(&self) -> &'static str {
        match self {
            Self::Item => "DestinyInventoryItemDefinition",
            Self::Bucket => "DestinyInventoryBucketDefinition",
            Self::PlugSet => "DestinyPlugSetDefinition",
        }
    }

    pub fn from_table_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.table_name() == name)
    }
}

/// One raw definition record
#[derive(Debug, Clone)]
pub struct ManifestRow {
    pub hash: DefinitionHash,
    pub kind: DefinitionKind,
    pub record: serde_json::Value,
}

/// Errors reading a dump
#[derive(Debug, thiserror::Error)]
pub enum DumpError {
    #[error("Manifest dump is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Already-fetched manifest content, partitioned by definition kind
#[derive(Debug, Clone, Default)]
pub struct ManifestDump {
    rows: Vec<ManifestRow>,
}

impl ManifestDump {
    pub fn from_rows(rows: Vec<ManifestRow>) -> Self {
        Self { rows }
    }

    /// Parse the remote JSON layout. Unknown tables are ignored and rows whose
    /// key is not a hash are skipped.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, DumpError> {
        let tables: IndexMap<String, IndexMap<String, serde_json::Value>> =
            serde_json::from_slice(bytes)?;

        let mut rows = Vec::new();
        for (table, records) in tables {
            let Some(kind) = DefinitionKind::from_table_name(&table) else {
                continue;
            };
            for (key, record) in records {
                match key.parse::<DefinitionHash>() {
                    Ok(hash) => rows.push(ManifestRow { hash, kind, record }),
                    Err(e) => warn!(table = %table, key = %key, "Skipping manifest row: {}", e),
                }
            }
        }
        Ok(Self { rows })
    }

    pub fn push(&mut self, row: ManifestRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[ManifestRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Raw record shapes
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawDisplayProperties {
    name: String,
    description: String,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawInventoryBlock {
    tier_type_name: Option<String>,
    bucket_type_hash: Option<i64>,
    max_stack_size: u32,
}

impl Default for RawInventoryBlock {
    fn default() -> Self {
        Self {
            tier_type_name: None,
            bucket_type_hash: None,
            max_stack_size: 1,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlugBlock {
    #[serde(default)]
    plug_category_identifier: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPlugItem {
    plug_item_hash: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSocketEntry {
    single_initial_item_hash: i64,
    reusable_plug_items: Vec<RawPlugItem>,
    randomized_plug_set_hash: Option<i64>,
    reusable_plug_set_hash: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawSocketBlock {
    socket_entries: Vec<RawSocketEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItemRecord {
    #[serde(default)]
    display_properties: RawDisplayProperties,
    #[serde(default)]
    item_type_display_name: Option<String>,
    #[serde(default)]
    inventory: RawInventoryBlock,
    #[serde(default)]
    item_type: i32,
    #[serde(default)]
    item_sub_type: i32,
    #[serde(default = "any_class")]
    class_type: i32,
    #[serde(default)]
    non_transferrable: bool,
    #[serde(default)]
    equippable: bool,
    #[serde(default)]
    plug: Option<RawPlugBlock>,
    #[serde(default)]
    sockets: Option<RawSocketBlock>,
}

fn any_class() -> i32 {
    ClassType::Any.code()
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawBucketRecord {
    display_properties: RawDisplayProperties,
    category: i32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawPlugSetRecord {
    reusable_plug_items: Vec<RawPlugItem>,
}

// ============================================================================
// Compilation
// ============================================================================

/// Typed rows ready to be written to the cache
#[derive(Debug, Default)]
pub struct CompiledManifest {
    pub items: Vec<ItemDefinition>,
    pub buckets: Vec<BucketDefinition>,
    /// Perk pool per weapon, in item order
    pub weapon_perks: Vec<(DefinitionHash, IndexSet<DefinitionHash>)>,
}

/// Decode every row of the dump. Records that fail to decode are skipped with
/// a warning; a repeated hash keeps the first record.
pub fn compile(dump: &ManifestDump) -> CompiledManifest {
    let mut items: IndexMap<DefinitionHash, (ItemDefinition, Option<RawSocketBlock>)> =
        IndexMap::new();
    let mut buckets: IndexMap<DefinitionHash, BucketDefinition> = IndexMap::new();
    let mut plug_sets: IndexMap<DefinitionHash, Vec<DefinitionHash>> = IndexMap::new();

    for row in dump.rows() {
        match row.kind {
            DefinitionKind::Item => {
                if items.contains_key(&row.hash) {
                    warn!(hash = %row.hash, "Duplicate item definition ignored");
                    continue;
                }
                match serde_json::from_value::<RawItemRecord>(row.record.clone()) {
                    Ok(raw) => {
                        let (def, sockets) = item_from_raw(row.hash, raw);
                        items.insert(row.hash, (def, sockets));
                    }
                    Err(e) => warn!(hash = %row.hash, "Skipping item definition: {}", e),
                }
            }
            DefinitionKind::Bucket => {
                if buckets.contains_key(&row.hash) {
                    warn!(hash = %row.hash, "Duplicate bucket definition ignored");
                    continue;
                }
                match serde_json::from_value::<RawBucketRecord>(row.record.clone()) {
                    Ok(raw) => {
                        buckets.insert(
                            row.hash,
                            BucketDefinition {
                                hash: row.hash,
                                name: raw.display_properties.name,
                                category: BucketCategory::from_code(raw.category),
                            },
                        );
                    }
                    Err(e) => warn!(hash = %row.hash, "Skipping bucket definition: {}", e),
                }
            }
            DefinitionKind::PlugSet => {
                match serde_json::from_value::<RawPlugSetRecord>(row.record.clone()) {
                    Ok(raw) => {
                        let plugs = raw
                            .reusable_plug_items
                            .iter()
                            .filter_map(|p| nonzero_hash(p.plug_item_hash))
                            .collect();
                        plug_sets.entry(row.hash).or_insert(plugs);
                    }
                    Err(e) => warn!(hash = %row.hash, "Skipping plug set definition: {}", e),
                }
            }
        }
    }

    let mut weapon_perks = Vec::new();
    let mut defs = Vec::with_capacity(items.len());
    for (hash, (def, sockets)) in items {
        if def.is_weapon() {
            let pool = sockets
                .map(|s| perk_pool(&s, &plug_sets))
                .unwrap_or_default();
            weapon_perks.push((hash, pool));
        }
        defs.push(def);
    }

    CompiledManifest {
        items: defs,
        buckets: buckets.into_values().collect(),
        weapon_perks,
    }
}

fn item_from_raw(hash: DefinitionHash, raw: RawItemRecord) -> (ItemDefinition, Option<RawSocketBlock>) {
    let def = ItemDefinition {
        hash,
        name: raw.display_properties.name,
        description: raw.display_properties.description,
        icon: raw.display_properties.icon,
        tier_type_name: raw.inventory.tier_type_name,
        item_type: ItemType::from_code(raw.item_type),
        item_sub_type: raw.item_sub_type,
        class_type: ClassType::from_code(raw.class_type),
        bucket_hash: raw.inventory.bucket_type_hash.and_then(nonzero_hash),
        max_stack_size: raw.inventory.max_stack_size,
        non_transferrable: raw.non_transferrable,
        equippable: raw.equippable,
        archetype: raw.item_type_display_name.filter(|s| !s.is_empty()),
        plug_category: raw.plug.map(|p| p.plug_category_identifier),
    };
    (def, raw.sockets)
}

/// Zero is the remote API's "no hash" value
fn nonzero_hash(value: i64) -> Option<DefinitionHash> {
    DefinitionHash::from_i64(value).filter(|h| h.get() != 0)
}

fn perk_pool(
    sockets: &RawSocketBlock,
    plug_sets: &IndexMap<DefinitionHash, Vec<DefinitionHash>>,
) -> IndexSet<DefinitionHash> {
    let mut pool = IndexSet::new();
    for entry in &sockets.socket_entries {
        pool.extend(nonzero_hash(entry.single_initial_item_hash));
        pool.extend(
            entry
                .reusable_plug_items
                .iter()
                .filter_map(|p| nonzero_hash(p.plug_item_hash)),
        );
        for set_hash in [entry.randomized_plug_set_hash, entry.reusable_plug_set_hash]
            .into_iter()
            .flatten()
            .filter_map(nonzero_hash)
        {
            if let Some(plugs) = plug_sets.get(&set_hash) {
                pool.extend(plugs.iter().copied());
            }
        }
    }
    pool
}
