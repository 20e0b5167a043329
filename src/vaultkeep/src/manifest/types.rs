//! Definition types served by the manifest store.
//!
//! These are the typed projections of the remote definition records. They are
//! immutable once loaded and identified by their hash.

use crate::hash::DefinitionHash;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Item classification as published by the remote API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    None,
    Currency,
    Armor,
    Weapon,
    Message,
    Engram,
    Consumable,
    ExchangeMaterial,
    MissionReward,
    QuestStep,
    QuestStepComplete,
    Emblem,
    Quest,
    Subclass,
    ClanBanner,
    Aura,
    Mod,
    Dummy,
    Ship,
    Vehicle,
    Emote,
    Ghost,
    Package,
    Bounty,
    Wrapper,
    SeasonalArtifact,
    Finisher,
    Pattern,
    Other(i32),
}

impl ItemType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Currency,
            2 => Self::Armor,
            3 => Self::Weapon,
            7 => Self::Message,
            8 => Self::Engram,
            9 => Self::Consumable,
            10 => Self::ExchangeMaterial,
            11 => Self::MissionReward,
            12 => Self::QuestStep,
            13 => Self::QuestStepComplete,
            14 => Self::Emblem,
            15 => Self::Quest,
            16 => Self::Subclass,
            17 => Self::ClanBanner,
            18 => Self::Aura,
            19 => Self::Mod,
            20 => Self::Dummy,
            21 => Self::Ship,
            22 => Self::Vehicle,
            23 => Self::Emote,
            24 => Self::Ghost,
            25 => Self::Package,
            26 => Self::Bounty,
            27 => Self::Wrapper,
            28 => Self::SeasonalArtifact,
            29 => Self::Finisher,
            30 => Self::Pattern,
            other => Self::Other(other),
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::None => 0,
            Self::Currency => 1,
            Self::Armor => 2,
            Self::Weapon => 3,
            Self::Message => 7,
            Self::Engram => 8,
            Self::Consumable => 9,
            Self::ExchangeMaterial => 10,
            Self::MissionReward => 11,
            Self::QuestStep => 12,
            Self::QuestStepComplete => 13,
            Self::Emblem => 14,
            Self::Quest => 15,
            Self::Subclass => 16,
            Self::ClanBanner => 17,
            Self::Aura => 18,
            Self::Mod => 19,
            Self::Dummy => 20,
            Self::Ship => 21,
            Self::Vehicle => 22,
            Self::Emote => 23,
            Self::Ghost => 24,
            Self::Package => 25,
            Self::Bounty => 26,
            Self::Wrapper => 27,
            Self::SeasonalArtifact => 28,
            Self::Finisher => 29,
            Self::Pattern => 30,
            Self::Other(code) => *code,
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Currency => write!(f, "currency"),
            Self::Armor => write!(f, "armor"),
            Self::Weapon => write!(f, "weapon"),
            Self::Message => write!(f, "message"),
            Self::Engram => write!(f, "engram"),
            Self::Consumable => write!(f, "consumable"),
            Self::ExchangeMaterial => write!(f, "material"),
            Self::MissionReward => write!(f, "mission_reward"),
            Self::QuestStep => write!(f, "quest_step"),
            Self::QuestStepComplete => write!(f, "quest_step_complete"),
            Self::Emblem => write!(f, "emblem"),
            Self::Quest => write!(f, "quest"),
            Self::Subclass => write!(f, "subclass"),
            Self::ClanBanner => write!(f, "clan_banner"),
            Self::Aura => write!(f, "aura"),
            Self::Mod => write!(f, "mod"),
            Self::Dummy => write!(f, "dummy"),
            Self::Ship => write!(f, "ship"),
            Self::Vehicle => write!(f, "vehicle"),
            Self::Emote => write!(f, "emote"),
            Self::Ghost => write!(f, "ghost"),
            Self::Package => write!(f, "package"),
            Self::Bounty => write!(f, "bounty"),
            Self::Wrapper => write!(f, "wrapper"),
            Self::SeasonalArtifact => write!(f, "seasonal_artifact"),
            Self::Finisher => write!(f, "finisher"),
            Self::Pattern => write!(f, "pattern"),
            Self::Other(code) => write!(f, "type_{}", code),
        }
    }
}

/// Sub type code of shader plugs
pub const SHADER_SUB_TYPE: i32 = 20;

/// Character class, also used as an item's class restriction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassType {
    Titan,
    Hunter,
    Warlock,
    /// No class restriction
    #[default]
    Any,
}

impl ClassType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Titan,
            1 => Self::Hunter,
            2 => Self::Warlock,
            _ => Self::Any,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Titan => 0,
            Self::Hunter => 1,
            Self::Warlock => 2,
            Self::Any => 3,
        }
    }
}

impl std::fmt::Display for ClassType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Titan => write!(f, "titan"),
            Self::Hunter => write!(f, "hunter"),
            Self::Warlock => write!(f, "warlock"),
            Self::Any => write!(f, "any"),
        }
    }
}

impl std::str::FromStr for ClassType {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "titan" => Ok(Self::Titan),
            "hunter" => Ok(Self::Hunter),
            "warlock" => Ok(Self::Warlock),
            "any" => Ok(Self::Any),
            _ => Err(ParseError::InvalidClass(s.to_string())),
        }
    }
}

/// Damage type of an item instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    None,
    Kinetic,
    Arc,
    Solar,
    Void,
    Raid,
    Stasis,
    Strand,
    Other(i32),
}

impl DamageType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::None,
            1 => Self::Kinetic,
            2 => Self::Arc,
            3 => Self::Solar,
            4 => Self::Void,
            5 => Self::Raid,
            6 => Self::Stasis,
            7 => Self::Strand,
            other => Self::Other(other),
        }
    }
}

impl std::fmt::Display for DamageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Kinetic => write!(f, "kinetic"),
            Self::Arc => write!(f, "arc"),
            Self::Solar => write!(f, "solar"),
            Self::Void => write!(f, "void"),
            Self::Raid => write!(f, "raid"),
            Self::Stasis => write!(f, "stasis"),
            Self::Strand => write!(f, "strand"),
            Self::Other(code) => write!(f, "damage_{}", code),
        }
    }
}

/// Bucket category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BucketCategory {
    Invisible,
    Item,
    Currency,
    Equippable,
    Ignored,
}

impl BucketCategory {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => Self::Item,
            2 => Self::Currency,
            3 => Self::Equippable,
            4 => Self::Ignored,
            _ => Self::Invisible,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Invisible => 0,
            Self::Item => 1,
            Self::Currency => 2,
            Self::Equippable => 3,
            Self::Ignored => 4,
        }
    }
}

impl std::fmt::Display for BucketCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invisible => write!(f, "invisible"),
            Self::Item => write!(f, "item"),
            Self::Currency => write!(f, "currency"),
            Self::Equippable => write!(f, "equippable"),
            Self::Ignored => write!(f, "ignored"),
        }
    }
}

/// Item definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub hash: DefinitionHash,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub tier_type_name: Option<String>,
    pub item_type: ItemType,
    pub item_sub_type: i32,
    pub class_type: ClassType,
    pub bucket_hash: Option<DefinitionHash>,
    pub max_stack_size: u32,
    pub non_transferrable: bool,
    pub equippable: bool,
    /// Item type display label ("Hand Cannon", "Helmet", ...)
    pub archetype: Option<String>,
    /// Plug category identifier; only plug items have one
    pub plug_category: Option<String>,
}

impl ItemDefinition {
    pub fn is_plug(&self) -> bool {
        self.plug_category.is_some()
    }

    pub fn is_weapon(&self) -> bool {
        self.item_type == ItemType::Weapon
    }

    /// Perk projection of this definition, if it is a plug
    pub fn as_perk(&self) -> Option<PerkDefinition> {
        let plug_category = self.plug_category.clone()?;
        Some(PerkDefinition {
            hash: self.hash,
            name: self.name.clone(),
            description: self.description.clone(),
            icon: self.icon.clone(),
            plug_category,
        })
    }
}

/// Inventory bucket definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketDefinition {
    pub hash: DefinitionHash,
    pub name: String,
    pub category: BucketCategory,
}

/// Plug item viewed as a perk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkDefinition {
    pub hash: DefinitionHash,
    pub name: String,
    pub description: String,
    pub icon: Option<String>,
    pub plug_category: String,
}

/// Weapon subset used for roll matching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponDefinition {
    pub hash: DefinitionHash,
    pub name: String,
    pub archetype: Option<String>,
    pub tier_type_name: Option<String>,
    /// Every perk the weapon can roll, in first-seen socket order
    pub perk_hashes: IndexSet<DefinitionHash>,
}

impl WeaponDefinition {
    /// True when the weapon can roll at least one of `candidates`
    pub fn has_any_perk(&self, candidates: &[DefinitionHash]) -> bool {
        candidates.iter().any(|hash| self.perk_hashes.contains(hash))
    }
}

/// Counts reported by [`ManifestStore::stats`](crate::manifest::ManifestStore::stats)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestStats {
    pub version: Option<String>,
    pub item_count: i64,
    pub bucket_count: i64,
    pub perk_count: i64,
    pub weapon_count: i64,
}

/// Parse errors for string conversions
#[derive(Debug, Clone, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid class: {0}")]
    InvalidClass(String),
}
