//! Game-data cache and inventory query engine for vaultkeep
//!
//! This library mirrors the game's versioned manifest into a local SQLite
//! cache, turns an account snapshot into an indexed inventory, and compiles a
//! small filter language into predicates over that inventory.
//!
//! # Example
//!
//! ```no_run
//! use vaultkeep::{build_inventory_index, parse_query, ManifestStore, ProfileSnapshot};
//!
//! let store = ManifestStore::open("/tmp/vaultkeep").unwrap();
//! let snapshot = ProfileSnapshot::from_json_slice(&std::fs::read("profile.json").unwrap()).unwrap();
//! let index = build_inventory_index(&snapshot, &store).unwrap();
//!
//! let query = parse_query("is:weapon tier:exotic").unwrap();
//! for item in query.filter(&index) {
//!     println!("{} ({})", item.name, item.location);
//! }
//! ```

pub mod hash;
pub mod inventory;
pub mod manifest;
pub mod perks;
pub mod query;

pub use hash::{DefinitionHash, HashError};
pub use inventory::{
    build_inventory_index, highest_power, InventoryError, InventoryIndex, InventoryItem,
    ItemLocation, ProfileSnapshot, SnapshotError,
};
pub use manifest::{
    BucketDefinition, ClassType, DamageType, ItemDefinition, ItemType, ManifestDump,
    ManifestError, ManifestResult, ManifestStats, ManifestStore, PerkDefinition,
    WeaponDefinition,
};
pub use perks::{find_rolls, match_weapons, parse_roll_expression, resolve_perk_groups, PerkError};
pub use query::{parse_query, Query, QueryError, Term};
