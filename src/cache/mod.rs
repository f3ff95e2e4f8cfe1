//! Local JSON file cache for remote API responses
//!
//! Every list response is stored verbatim under a cache directory and reused
//! until the directory is rebuilt wholesale.

pub(crate) mod fetch;

pub use fetch::{cached_fetch, try_cached_fetch, HttpTransport, Transport};

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};

use crate::error::Result;

/// Name of the system list file inside a catalog cache directory
pub const SYSTEMS_FILE: &str = "systems.json";

/// Subdirectory holding one game list per system
pub const GAMELIST_DIR: &str = "gamelist";

/// Clear all cached data
pub fn clear_all(cache_dir: &Path) -> Result<()> {
    if cache_dir.exists() {
        std::fs::remove_dir_all(cache_dir)?;
    }
    Ok(())
}

/// Get cache status information for a catalog cache directory
pub fn status(cache_dir: &Path) -> CacheStatus {
    let systems_file = cache_dir.join(SYSTEMS_FILE);
    let updated_at = std::fs::metadata(&systems_file)
        .and_then(|m| m.modified())
        .ok()
        .map(to_local);

    let gamelists = std::fs::read_dir(cache_dir.join(GAMELIST_DIR))
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
                .count()
        })
        .ok();

    CacheStatus {
        exists: systems_file.exists(),
        updated_at,
        gamelists,
    }
}

fn to_local(time: SystemTime) -> DateTime<Local> {
    DateTime::<Local>::from(time)
}

/// Catalog cache status
#[derive(Debug)]
pub struct CacheStatus {
    /// Whether the system list has been downloaded
    pub exists: bool,
    /// Modification time of the system list
    pub updated_at: Option<DateTime<Local>>,
    /// Number of cached per-system game lists
    pub gamelists: Option<usize>,
}
