//! SQL schema and column lists for the manifest cache.

use std::time::Duration;

/// File name of the cache database inside the cache directory
pub const CACHE_FILE: &str = "manifest.sqlite";

/// File name of the advisory lock guarding rebuilds
pub const LOCK_FILE: &str = "manifest.lock";

/// How long a cache handle waits on another process's write transaction
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// `meta` key holding the cached manifest version
pub const VERSION_KEY: &str = "version";

/// Columns of the items table, in the order `row_to_item` reads them
pub const ITEM_SELECT_COLUMNS: &str = "hash, name, description, icon, tier_type_name, item_type,
                    item_sub_type, class_type, bucket_hash, max_stack_size, non_transferrable,
                    equippable, archetype, plug_category";

pub const BUCKET_SELECT_COLUMNS: &str = "hash, name, category";

/// Tables emptied by a rebuild, children first
pub const REBUILT_TABLES: &[&str] = &["weapon_perks", "buckets", "items"];

/// Full cache schema. `id` carries definition order; `hash` is the lookup key.
pub const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        hash INTEGER NOT NULL UNIQUE,
        name TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        icon TEXT,
        tier_type_name TEXT,
        item_type INTEGER NOT NULL,
        item_sub_type INTEGER NOT NULL DEFAULT 0,
        class_type INTEGER NOT NULL DEFAULT 3,
        bucket_hash INTEGER,
        max_stack_size INTEGER NOT NULL DEFAULT 1,
        non_transferrable BOOLEAN NOT NULL DEFAULT FALSE,
        equippable BOOLEAN NOT NULL DEFAULT FALSE,
        archetype TEXT,
        plug_category TEXT
    );

    CREATE TABLE IF NOT EXISTS buckets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        hash INTEGER NOT NULL UNIQUE,
        name TEXT NOT NULL,
        category INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS weapon_perks (
        weapon_hash INTEGER NOT NULL REFERENCES items(hash) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        perk_hash INTEGER NOT NULL,
        PRIMARY KEY (weapon_hash, perk_hash)
    );

    CREATE INDEX IF NOT EXISTS idx_items_item_type ON items(item_type);
    CREATE INDEX IF NOT EXISTS idx_weapon_perks_weapon ON weapon_perks(weapon_hash, position);
"#;
