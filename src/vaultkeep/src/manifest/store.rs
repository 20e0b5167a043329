//! SQLite-backed manifest cache using rusqlite.
//!
//! The store owns a single connection behind a mutex. Lookups and the
//! rebuild path both go through it, so a reader never sees a half-written
//! cache; the rebuild itself runs in one transaction. Across processes,
//! rebuilds additionally hold the advisory [`CacheLock`].

use crate::hash::DefinitionHash;
use crate::manifest::dump::{compile, CompiledManifest, ManifestDump};
use crate::manifest::lock::CacheLock;
use crate::manifest::schema::{self, BUCKET_SELECT_COLUMNS, ITEM_SELECT_COLUMNS};
use crate::manifest::types::*;
use crate::perks;
use indexmap::IndexSet;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Error type for manifest store operations
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("Manifest cache unavailable at {}: {reason}", path.display())]
    CacheUnavailable { path: PathBuf, reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to lock manifest cache at {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to fetch manifest content: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Manifest store is closed")]
    Closed,
}

/// Result type for manifest store operations
pub type ManifestResult<T> = Result<T, ManifestError>;

/// Local mirror of the versioned manifest
pub struct ManifestStore {
    conn: Mutex<Option<Connection>>,
    lock_path: Option<PathBuf>,
}

fn hash_column(value: i64) -> rusqlite::Result<DefinitionHash> {
    DefinitionHash::from_i64(value).ok_or(rusqlite::Error::IntegralValueOutOfRange(0, value))
}

fn row_to_item(row: &rusqlite::Row<'_>) -> rusqlite::Result<ItemDefinition> {
    Ok(ItemDefinition {
        hash: hash_column(row.get(0)?)?,
        name: row.get(1)?,
        description: row.get(2)?,
        icon: row.get(3)?,
        tier_type_name: row.get(4)?,
        item_type: ItemType::from_code(row.get(5)?),
        item_sub_type: row.get(6)?,
        class_type: ClassType::from_code(row.get(7)?),
        bucket_hash: row
            .get::<_, Option<i64>>(8)?
            .map(hash_column)
            .transpose()?,
        max_stack_size: row.get(9)?,
        non_transferrable: row.get(10)?,
        equippable: row.get(11)?,
        archetype: row.get(12)?,
        plug_category: row.get(13)?,
    })
}

fn row_to_bucket(row: &rusqlite::Row<'_>) -> rusqlite::Result<BucketDefinition> {
    Ok(BucketDefinition {
        hash: hash_column(row.get(0)?)?,
        name: row.get(1)?,
        category: BucketCategory::from_code(row.get(2)?),
    })
}

fn read_version(conn: &Connection) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT value FROM meta WHERE key = ?1",
        params![schema::VERSION_KEY],
        |row| row.get(0),
    )
    .optional()
}

fn write_compiled(
    conn: &mut Connection,
    version: &str,
    compiled: &CompiledManifest,
) -> rusqlite::Result<()> {
    let tx = conn.transaction()?;

    for table in schema::REBUILT_TABLES {
        tx.execute(&format!("DELETE FROM {}", table), [])?;
    }
    // Restart definition order so identical input yields identical ids
    tx.execute(
        "DELETE FROM sqlite_sequence WHERE name IN ('items', 'buckets')",
        [],
    )?;

    {
        let mut insert_item = tx.prepare(&format!(
            "INSERT INTO items ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            ITEM_SELECT_COLUMNS
        ))?;
        for def in &compiled.items {
            insert_item.execute(params![
                def.hash.get(),
                def.name,
                def.description,
                def.icon,
                def.tier_type_name,
                def.item_type.code(),
                def.item_sub_type,
                def.class_type.code(),
                def.bucket_hash.map(DefinitionHash::get),
                def.max_stack_size,
                def.non_transferrable,
                def.equippable,
                def.archetype,
                def.plug_category,
            ])?;
        }

        let mut insert_bucket = tx.prepare(&format!(
            "INSERT INTO buckets ({}) VALUES (?1, ?2, ?3)",
            BUCKET_SELECT_COLUMNS
        ))?;
        for bucket in &compiled.buckets {
            insert_bucket.execute(params![
                bucket.hash.get(),
                bucket.name,
                bucket.category.code()
            ])?;
        }

        let mut insert_perk = tx.prepare(
            "INSERT INTO weapon_perks (weapon_hash, position, perk_hash) VALUES (?1, ?2, ?3)",
        )?;
        for (weapon, pool) in &compiled.weapon_perks {
            for (position, perk) in pool.iter().enumerate() {
                insert_perk.execute(params![weapon.get(), position as i64, perk.get()])?;
            }
        }
    }

    tx.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![schema::VERSION_KEY, version],
    )?;

    tx.commit()
}

impl ManifestStore {
    /// Open or create the cache inside `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> ManifestResult<Self> {
        let dir = dir.as_ref();
        let unavailable = |reason: String| ManifestError::CacheUnavailable {
            path: dir.to_path_buf(),
            reason,
        };

        std::fs::create_dir_all(dir).map_err(|e| unavailable(e.to_string()))?;
        let conn =
            Connection::open(dir.join(schema::CACHE_FILE)).map_err(|e| unavailable(e.to_string()))?;
        // Another process may be mid-rebuild; wait for its transaction
        conn.busy_timeout(schema::BUSY_TIMEOUT)
            .map_err(|e| unavailable(e.to_string()))?;
        conn.execute_batch(schema::SCHEMA)
            .map_err(|e| unavailable(e.to_string()))?;

        debug!(path = %dir.display(), "Opened manifest cache");
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            lock_path: Some(dir.join(schema::LOCK_FILE)),
        })
    }

    /// Open an in-memory cache (for testing)
    pub fn open_in_memory() -> ManifestResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
            lock_path: None,
        })
    }

    /// Release the connection. Safe to call more than once.
    pub fn close(&self) -> ManifestResult<()> {
        if let Some(conn) = self.guard().take() {
            conn.close().map_err(|(_, e)| ManifestError::Database(e))?;
            debug!("Closed manifest cache");
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.guard().is_none()
    }

    fn guard(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> ManifestResult<T> {
        let guard = self.guard();
        let conn = guard.as_ref().ok_or(ManifestError::Closed)?;
        Ok(f(conn)?)
    }

    fn lock_cache(&self) -> ManifestResult<Option<CacheLock>> {
        let Some(path) = &self.lock_path else {
            return Ok(None);
        };
        CacheLock::acquire(path)
            .map(Some)
            .map_err(|source| ManifestError::Lock {
                path: path.clone(),
                source,
            })
    }

    // === Versioning ===

    /// Version of the cached content, if any has been loaded
    pub fn cached_version(&self) -> ManifestResult<Option<String>> {
        self.with_conn(read_version)
    }

    /// Bring the cache up to `latest_version`.
    ///
    /// `fetch` is only called when the cached version differs. Returns whether
    /// a rebuild happened.
    pub fn sync<F, E>(&self, latest_version: &str, fetch: F) -> ManifestResult<bool>
    where
        F: FnOnce() -> Result<ManifestDump, E>,
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let _lock = self.lock_cache()?;

        if self.cached_version()?.as_deref() == Some(latest_version) {
            debug!(version = latest_version, "Manifest cache is current");
            return Ok(false);
        }

        let dump = fetch().map_err(|e| ManifestError::Fetch(e.into()))?;
        let compiled = compile(&dump);

        let mut guard = self.guard();
        let conn = guard.as_mut().ok_or(ManifestError::Closed)?;
        // Another handle in this process may have finished the same rebuild
        if read_version(conn)?.as_deref() == Some(latest_version) {
            return Ok(false);
        }
        write_compiled(conn, latest_version, &compiled)?;
        info!(
            version = latest_version,
            items = compiled.items.len(),
            buckets = compiled.buckets.len(),
            "Rebuilt manifest cache"
        );
        Ok(true)
    }

    /// Truncate the cache and reload it from `dump`, regardless of version
    pub fn rebuild(&self, version: &str, dump: &ManifestDump) -> ManifestResult<()> {
        let _lock = self.lock_cache()?;
        let compiled = compile(dump);

        let mut guard = self.guard();
        let conn = guard.as_mut().ok_or(ManifestError::Closed)?;
        write_compiled(conn, version, &compiled)?;
        info!(
            version,
            items = compiled.items.len(),
            buckets = compiled.buckets.len(),
            "Rebuilt manifest cache"
        );
        Ok(())
    }

    // === Lookups ===

    /// Item definition by hash. Signed hashes are normalized.
    pub fn lookup_item(
        &self,
        hash: impl Into<DefinitionHash>,
    ) -> ManifestResult<Option<ItemDefinition>> {
        let hash = hash.into();
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM items WHERE hash = ?1", ITEM_SELECT_COLUMNS),
                params![hash.get()],
                row_to_item,
            )
            .optional()
        })
    }

    /// Bucket definition by hash
    pub fn lookup_bucket(
        &self,
        hash: impl Into<DefinitionHash>,
    ) -> ManifestResult<Option<BucketDefinition>> {
        let hash = hash.into();
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM buckets WHERE hash = ?1", BUCKET_SELECT_COLUMNS),
                params![hash.get()],
                row_to_bucket,
            )
            .optional()
        })
    }

    /// Perk definition by hash; `None` when the hash is unknown or not a plug
    pub fn lookup_perk(
        &self,
        hash: impl Into<DefinitionHash>,
    ) -> ManifestResult<Option<PerkDefinition>> {
        Ok(self.lookup_item(hash)?.and_then(|def| def.as_perk()))
    }

    // === Search ===

    /// Case-insensitive substring search over item names, in definition order
    pub fn search_items(&self, text: &str) -> ManifestResult<Vec<ItemDefinition>> {
        self.scan_items(text, false)
    }

    /// Like [`search_items`](Self::search_items), restricted to plugs
    pub fn search_perks(&self, text: &str) -> ManifestResult<Vec<PerkDefinition>> {
        Ok(self
            .scan_items(text, true)?
            .iter()
            .filter_map(ItemDefinition::as_perk)
            .collect())
    }

    fn scan_items(&self, text: &str, plugs_only: bool) -> ManifestResult<Vec<ItemDefinition>> {
        let needle = text.to_lowercase();
        let sql = format!(
            "SELECT {} FROM items {} ORDER BY id",
            ITEM_SELECT_COLUMNS,
            if plugs_only {
                "WHERE plug_category IS NOT NULL"
            } else {
                ""
            }
        );
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], row_to_item)?;
            let mut matches = Vec::new();
            for row in rows {
                let def = row?;
                if def.name.to_lowercase().contains(&needle) {
                    matches.push(def);
                }
            }
            Ok(matches)
        })
    }

    /// Every weapon with its perk pool, in definition order
    pub fn weapons(&self) -> ManifestResult<Vec<WeaponDefinition>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT i.hash, i.name, i.archetype, i.tier_type_name, p.perk_hash
                 FROM items i
                 LEFT JOIN weapon_perks p ON p.weapon_hash = i.hash
                 WHERE i.item_type = ?1
                 ORDER BY i.id, p.position",
            )?;
            let mut rows = stmt.query(params![ItemType::Weapon.code()])?;

            let mut weapons: Vec<WeaponDefinition> = Vec::new();
            while let Some(row) = rows.next()? {
                let hash = hash_column(row.get(0)?)?;
                let perk = row
                    .get::<_, Option<i64>>(4)?
                    .map(hash_column)
                    .transpose()?;

                let same_weapon = weapons.last().is_some_and(|w| w.hash == hash);
                if !same_weapon {
                    weapons.push(WeaponDefinition {
                        hash,
                        name: row.get(1)?,
                        archetype: row.get(2)?,
                        tier_type_name: row.get(3)?,
                        perk_hashes: IndexSet::new(),
                    });
                }
                if let (Some(perk), Some(weapon)) = (perk, weapons.last_mut()) {
                    weapon.perk_hashes.insert(perk);
                }
            }
            Ok(weapons)
        })
    }

    /// Weapons whose perk pool intersects every group, optionally narrowed by
    /// archetype. An empty group list matches every weapon.
    pub fn find_weapons_by_perk_groups(
        &self,
        groups: &[Vec<DefinitionHash>],
        archetype: Option<&str>,
    ) -> ManifestResult<Vec<WeaponDefinition>> {
        let weapons = self.weapons()?;
        Ok(perks::match_weapons(weapons, groups, archetype))
    }

    // === Statistics ===

    pub fn stats(&self) -> ManifestResult<ManifestStats> {
        self.with_conn(|conn| {
            let count = |sql: &str| -> rusqlite::Result<i64> {
                conn.query_row(sql, [], |row| row.get(0))
            };
            Ok(ManifestStats {
                version: read_version(conn)?,
                item_count: count("SELECT COUNT(*) FROM items")?,
                bucket_count: count("SELECT COUNT(*) FROM buckets")?,
                perk_count: count("SELECT COUNT(*) FROM items WHERE plug_category IS NOT NULL")?,
                weapon_count: conn.query_row(
                    "SELECT COUNT(*) FROM items WHERE item_type = ?1",
                    params![ItemType::Weapon.code()],
                    |row| row.get(0),
                )?,
            })
        })
    }
}

impl Drop for ManifestStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::dump::{DefinitionKind, ManifestRow};
    use serde_json::json;

    const ACE: u32 = 1001;
    const HIGH_HASH: u32 = 3_260_753_130;

    fn item_row(hash: u32, record: serde_json::Value) -> ManifestRow {
        ManifestRow {
            hash: DefinitionHash::new(hash),
            kind: DefinitionKind::Item,
            record,
        }
    }

    fn weapon(hash: u32, name: &str, archetype: &str, perks: &[u32]) -> ManifestRow {
        let plugs: Vec<_> = perks.iter().map(|p| json!({"plugItemHash": p})).collect();
        item_row(
            hash,
            json!({
                "displayProperties": {"name": name},
                "itemTypeDisplayName": archetype,
                "inventory": {"tierTypeName": "Legendary", "bucketTypeHash": 1498876634},
                "itemType": 3,
                "equippable": true,
                "sockets": {"socketEntries": [{"reusablePlugItems": plugs}]}
            }),
        )
    }

    fn perk(hash: u32, name: &str) -> ManifestRow {
        item_row(
            hash,
            json!({
                "displayProperties": {"name": name},
                "itemType": 19,
                "plug": {"plugCategoryIdentifier": "frames"}
            }),
        )
    }

    fn sample_dump() -> ManifestDump {
        ManifestDump::from_rows(vec![
            item_row(
                ACE,
                json!({
                    "displayProperties": {"name": "Ace of Spades", "icon": "/ace.jpg"},
                    "itemTypeDisplayName": "Hand Cannon",
                    "inventory": {"tierTypeName": "Exotic", "bucketTypeHash": 1498876634},
                    "itemType": 3,
                    "equippable": true,
                    "sockets": {"socketEntries": [{"singleInitialItemHash": 10}]}
                }),
            ),
            weapon(2001, "Fatebringer", "Hand Cannon", &[10, 20]),
            weapon(2002, "Gjallarhorn Replica", "Rocket Launcher", &[20]),
            perk(10, "Outlaw"),
            perk(20, "Rampage"),
            item_row(
                HIGH_HASH,
                json!({"displayProperties": {"name": "Glimmer"}, "itemType": 1,
                       "inventory": {"maxStackSize": 250000}}),
            ),
            ManifestRow {
                hash: DefinitionHash::new(1498876634),
                kind: DefinitionKind::Bucket,
                record: json!({"displayProperties": {"name": "Kinetic Weapons"}, "category": 3}),
            },
        ])
    }

    fn setup_store() -> ManifestStore {
        let store = ManifestStore::open_in_memory().unwrap();
        store.rebuild("v1", &sample_dump()).unwrap();
        store
    }

    #[test]
    fn test_lookup_item() {
        let store = setup_store();
        let ace = store.lookup_item(ACE).unwrap().unwrap();
        assert_eq!(ace.name, "Ace of Spades");
        assert_eq!(ace.tier_type_name.as_deref(), Some("Exotic"));
        assert_eq!(ace.item_type, ItemType::Weapon);
        assert!(store.lookup_item(42u32).unwrap().is_none());
    }

    #[test]
    fn test_lookup_signed_and_unsigned_agree() {
        let store = setup_store();
        let unsigned = store.lookup_item(HIGH_HASH).unwrap().unwrap();
        let signed_value = (HIGH_HASH as i64 - (1i64 << 32)) as i32;
        assert!(signed_value < 0);
        let signed = store.lookup_item(signed_value).unwrap().unwrap();
        assert_eq!(unsigned, signed);
        assert_eq!(signed.max_stack_size, 250000);
    }

    #[test]
    fn test_lookup_bucket() {
        let store = setup_store();
        let bucket = store.lookup_bucket(1498876634u32).unwrap().unwrap();
        assert_eq!(bucket.name, "Kinetic Weapons");
        assert_eq!(bucket.category, BucketCategory::Equippable);
        assert!(store.lookup_bucket(1u32).unwrap().is_none());
    }

    #[test]
    fn test_lookup_perk_only_for_plugs() {
        let store = setup_store();
        let outlaw = store.lookup_perk(10u32).unwrap().unwrap();
        assert_eq!(outlaw.name, "Outlaw");
        assert!(store.lookup_perk(ACE).unwrap().is_none());
        assert!(store.lookup_perk(999u32).unwrap().is_none());
    }

    #[test]
    fn test_search_items_case_insensitive() {
        let store = setup_store();
        let lower = store.search_items("ace").unwrap();
        let upper = store.search_items("ACE").unwrap();
        assert_eq!(lower.len(), 1);
        assert_eq!(lower[0].hash.get(), ACE);
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_search_items_definition_order() {
        let store = setup_store();
        let names: Vec<String> = store
            .search_items("a")
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["Ace of Spades", "Fatebringer", "Gjallarhorn Replica", "Outlaw", "Rampage"]
        );
    }

    #[test]
    fn test_search_perks() {
        let store = setup_store();
        let perks = store.search_perks("RAMP").unwrap();
        assert_eq!(perks.len(), 1);
        assert_eq!(perks[0].hash.get(), 20);
        assert!(store.search_perks("ace").unwrap().is_empty());
    }

    #[test]
    fn test_weapons_carry_perk_pools() {
        let store = setup_store();
        let weapons = store.weapons().unwrap();
        let hashes: Vec<u32> = weapons.iter().map(|w| w.hash.get()).collect();
        assert_eq!(hashes, vec![ACE, 2001, 2002]);
        let fatebringer = &weapons[1];
        assert!(fatebringer.perk_hashes.contains(&DefinitionHash::new(10)));
        assert!(fatebringer.perk_hashes.contains(&DefinitionHash::new(20)));
    }

    #[test]
    fn test_find_weapons_by_perk_groups() {
        let store = setup_store();
        let outlaw = DefinitionHash::new(10);
        let rampage = DefinitionHash::new(20);

        let both = store
            .find_weapons_by_perk_groups(&vec![vec![outlaw], vec![rampage]], None)
            .unwrap();
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].name, "Fatebringer");

        let either = store
            .find_weapons_by_perk_groups(&vec![vec![outlaw, rampage]], None)
            .unwrap();
        assert_eq!(either.len(), 3);

        let rockets = store
            .find_weapons_by_perk_groups(&vec![vec![rampage]], Some("rocket"))
            .unwrap();
        assert_eq!(rockets.len(), 1);
        assert_eq!(rockets[0].hash.get(), 2002);
    }

    #[test]
    fn test_empty_groups_match_every_weapon() {
        let store = setup_store();
        let all = store.find_weapons_by_perk_groups(&[], None).unwrap();
        assert_eq!(all, store.weapons().unwrap());
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let store = setup_store();
        let before = (
            store.search_items("").unwrap(),
            store.weapons().unwrap(),
            store.stats().unwrap().item_count,
        );
        store.rebuild("v1", &sample_dump()).unwrap();
        let after = (
            store.search_items("").unwrap(),
            store.weapons().unwrap(),
            store.stats().unwrap().item_count,
        );
        assert_eq!(before, after);
    }

    #[test]
    fn test_rebuild_replaces_content_wholesale() {
        let store = setup_store();
        let next = ManifestDump::from_rows(vec![perk(30, "Kill Clip")]);
        store.rebuild("v2", &next).unwrap();

        assert!(store.lookup_item(ACE).unwrap().is_none());
        assert!(store.lookup_bucket(1498876634u32).unwrap().is_none());
        assert_eq!(store.lookup_perk(30u32).unwrap().unwrap().name, "Kill Clip");
        assert_eq!(store.cached_version().unwrap().as_deref(), Some("v2"));
    }

    #[test]
    fn test_sync_skips_fetch_when_current() {
        let store = setup_store();
        let rebuilt = store
            .sync("v1", || -> Result<ManifestDump, std::io::Error> {
                panic!("fetch must not run for a current cache")
            })
            .unwrap();
        assert!(!rebuilt);
    }

    #[test]
    fn test_sync_rebuilds_on_version_change() {
        let store = ManifestStore::open_in_memory().unwrap();
        assert_eq!(store.cached_version().unwrap(), None);

        let rebuilt = store
            .sync("v1", || Ok::<_, std::io::Error>(sample_dump()))
            .unwrap();
        assert!(rebuilt);
        assert_eq!(store.cached_version().unwrap().as_deref(), Some("v1"));
        assert!(store.lookup_item(ACE).unwrap().is_some());
    }

    #[test]
    fn test_sync_propagates_fetch_error() {
        let store = ManifestStore::open_in_memory().unwrap();
        let result = store.sync("v1", || {
            Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"))
        });
        assert!(matches!(result, Err(ManifestError::Fetch(_))));
        assert_eq!(store.cached_version().unwrap(), None);
    }

    #[test]
    fn test_stats() {
        let store = setup_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.version.as_deref(), Some("v1"));
        assert_eq!(stats.item_count, 6);
        assert_eq!(stats.bucket_count, 1);
        assert_eq!(stats.perk_count, 2);
        assert_eq!(stats.weapon_count, 3);
    }

    #[test]
    fn test_close_is_idempotent() {
        let store = setup_store();
        store.close().unwrap();
        store.close().unwrap();
        assert!(store.is_closed());
        assert!(matches!(store.lookup_item(ACE), Err(ManifestError::Closed)));
    }

    #[test]
    fn test_open_on_disk_persists_between_handles() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = ManifestStore::open(dir.path()).unwrap();
            store.rebuild("v1", &sample_dump()).unwrap();
            store.close().unwrap();
        }
        let store = ManifestStore::open(dir.path()).unwrap();
        assert_eq!(store.cached_version().unwrap().as_deref(), Some("v1"));
        assert_eq!(store.lookup_item(ACE).unwrap().unwrap().name, "Ace of Spades");
        assert!(dir.path().join(schema::LOCK_FILE).exists());
    }

    #[test]
    fn test_reads_wait_for_foreign_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::open(dir.path()).unwrap();
        store.rebuild("v1", &sample_dump()).unwrap();

        let other = Connection::open(dir.path().join(schema::CACHE_FILE)).unwrap();
        other
            .execute_batch("BEGIN EXCLUSIVE; DELETE FROM items WHERE hash = 2002;")
            .unwrap();
        let writer = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(200));
            other.execute_batch("ROLLBACK;").unwrap();
        });

        let found = store.lookup_item(2002u32).unwrap();
        writer.join().unwrap();
        assert_eq!(found.unwrap().name, "Gjallarhorn Replica");
    }

    #[test]
    fn test_open_unavailable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();

        let result = ManifestStore::open(blocker.join("cache"));
        assert!(matches!(result, Err(ManifestError::CacheUnavailable { .. })));
    }
}
