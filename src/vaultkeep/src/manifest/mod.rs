//! Local mirror of the versioned manifest.
//!
//! - [`dump`]: the raw definition rows and their compilation into typed records
//! - [`store`]: the SQLite cache and its lookups
//! - [`lock`]: the cross-process advisory lock taken by rebuilds

pub mod dump;
pub mod lock;
mod schema;
pub mod store;
pub mod types;

pub use dump::{compile, CompiledManifest, DefinitionKind, DumpError, ManifestDump, ManifestRow};
pub use lock::CacheLock;
pub use schema::{CACHE_FILE, LOCK_FILE};
pub use store::{ManifestError, ManifestResult, ManifestStore};
pub use types::*;
