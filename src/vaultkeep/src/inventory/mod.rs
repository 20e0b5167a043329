//! Account snapshot validation and the inventory index built from it.

pub mod index;
pub mod snapshot;

pub use index::{
    build_inventory_index, highest_power, Character, InventoryError, InventoryIndex,
    InventoryItem, ItemLocation,
};
pub use snapshot::{
    components_param, required_components, ComponentType, ProfileSnapshot, SnapshotError,
};
