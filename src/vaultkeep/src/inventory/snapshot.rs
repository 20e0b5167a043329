//! Typed schema for the account snapshot.
//!
//! The profile endpoint returns loosely-typed nested maps, each component
//! wrapped in a `{ "data": ... }` envelope and present only when requested.
//! This module validates that shape once; everything downstream works on
//! these structs.

use indexmap::IndexMap;
use serde::Deserialize;
use std::collections::HashMap;

/// Errors validating a snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Malformed profile snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Profile component codes understood by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    ProfileInventories,
    Characters,
    CharacterInventories,
    CharacterEquipment,
    ItemInstances,
    ItemSockets,
}

impl ComponentType {
    pub fn code(&self) -> u32 {
        match self {
            Self::ProfileInventories => 102,
            Self::Characters => 200,
            Self::CharacterInventories => 201,
            Self::CharacterEquipment => 205,
            Self::ItemInstances => 300,
            Self::ItemSockets => 305,
        }
    }
}

impl std::fmt::Display for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Components the profile fetch must request for an index build.
/// Sockets are only needed when perks should be attached.
pub fn required_components(with_perks: bool) -> Vec<ComponentType> {
    let mut components = vec![
        ComponentType::ProfileInventories,
        ComponentType::Characters,
        ComponentType::CharacterInventories,
        ComponentType::CharacterEquipment,
        ComponentType::ItemInstances,
    ];
    if with_perks {
        components.push(ComponentType::ItemSockets);
    }
    components
}

/// Comma-separated request value, e.g. `"102,200,201,205,300"`
pub fn components_param(components: &[ComponentType]) -> String {
    components
        .iter()
        .map(ComponentType::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// `{ "data": ... }` envelope around one component
#[derive(Debug, Clone, Deserialize)]
pub struct Component<T> {
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> Default for Component<T> {
    fn default() -> Self {
        Self { data: None }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterRecord {
    #[serde(default)]
    pub character_id: Option<String>,
    #[serde(default = "any_class")]
    pub class_type: i32,
    #[serde(default)]
    pub light: Option<i32>,
}

fn any_class() -> i32 {
    3
}

/// Raw item reference as found in inventories and equipment
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemComponent {
    pub item_hash: i64,
    #[serde(default)]
    pub item_instance_id: Option<String>,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub bucket_hash: Option<i64>,
    /// Bit flags; bit 0 is "locked"
    #[serde(default)]
    pub state: u32,
}

fn one() -> u32 {
    1
}

pub const ITEM_STATE_LOCKED: u32 = 1;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemList {
    #[serde(default)]
    pub items: Vec<ItemComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatValue {
    pub value: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyComponent {
    #[serde(default)]
    pub energy_capacity: i32,
    #[serde(default)]
    pub energy_used: i32,
}

/// Per-instance state
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceComponent {
    pub damage_type: i32,
    pub primary_stat: Option<StatValue>,
    pub is_equipped: bool,
    pub can_equip: bool,
    pub energy: Option<EnergyComponent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocketState {
    #[serde(default)]
    pub plug_hash: Option<i64>,
    #[serde(default = "enabled")]
    pub is_enabled: bool,
}

fn enabled() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SocketsComponent {
    #[serde(default)]
    pub sockets: Vec<SocketState>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ItemComponents {
    #[serde(default)]
    pub instances: Option<Component<HashMap<String, InstanceComponent>>>,
    #[serde(default)]
    pub sockets: Option<Component<HashMap<String, SocketsComponent>>>,
}

/// Account snapshot, keyed the way the profile response is
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub characters: Option<Component<IndexMap<String, CharacterRecord>>>,
    #[serde(default)]
    pub character_equipment: Option<Component<IndexMap<String, ItemList>>>,
    #[serde(default)]
    pub character_inventories: Option<Component<IndexMap<String, ItemList>>>,
    #[serde(default)]
    pub profile_inventory: Option<Component<ItemList>>,
    #[serde(default)]
    pub item_components: ItemComponents,
}

impl ProfileSnapshot {
    /// Validate a decoded response. Accepts either the bare profile object or
    /// the API's `{ "Response": ... }` wrapper.
    pub fn from_value(mut value: serde_json::Value) -> Result<Self, SnapshotError> {
        if let Some(inner) = value.get_mut("Response") {
            value = inner.take();
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    /// Whether the characters component was returned with data
    pub fn has_characters(&self) -> bool {
        self.characters.as_ref().is_some_and(|c| c.data.is_some())
    }

    /// Characters in response order; empty when the component is absent
    pub fn characters(&self) -> impl Iterator<Item = (&String, &CharacterRecord)> {
        self.characters
            .as_ref()
            .and_then(|c| c.data.as_ref())
            .into_iter()
            .flatten()
    }

    pub fn equipment(&self, character_id: &str) -> &[ItemComponent] {
        Self::character_items(self.character_equipment.as_ref(), character_id)
    }

    pub fn inventory(&self, character_id: &str) -> &[ItemComponent] {
        Self::character_items(self.character_inventories.as_ref(), character_id)
    }

    fn character_items<'a>(
        component: Option<&'a Component<IndexMap<String, ItemList>>>,
        character_id: &str,
    ) -> &'a [ItemComponent] {
        component
            .and_then(|c| c.data.as_ref())
            .and_then(|lists| lists.get(character_id))
            .map(|list| list.items.as_slice())
            .unwrap_or(&[])
    }

    /// Vault and other profile-level items
    pub fn vault(&self) -> &[ItemComponent] {
        self.profile_inventory
            .as_ref()
            .and_then(|c| c.data.as_ref())
            .map(|list| list.items.as_slice())
            .unwrap_or(&[])
    }

    pub fn instance(&self, instance_id: &str) -> Option<&InstanceComponent> {
        self.item_components
            .instances
            .as_ref()
            .and_then(|c| c.data.as_ref())
            .and_then(|map| map.get(instance_id))
    }

    /// Whether the sockets component was requested and returned
    pub fn has_sockets(&self) -> bool {
        self.item_components
            .sockets
            .as_ref()
            .is_some_and(|c| c.data.is_some())
    }

    pub fn sockets(&self, instance_id: &str) -> Option<&SocketsComponent> {
        self.item_components
            .sockets
            .as_ref()
            .and_then(|c| c.data.as_ref())
            .and_then(|map| map.get(instance_id))
    }
}
