//! Lazily loaded catalog with cache refresh
//!
//! [`GameLibrary`] owns the client and the in-memory catalog. The catalog is
//! built from the cache directory on first use and rebuilt whenever the
//! system list file changes on disk. [`GameLibrary::update_cache`] refetches
//! everything into a staging directory and swaps it in only on success.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{debug, info, warn};

use super::catalog::{Catalog, ExclusionRules, DEFAULT_SYSTEM_ID_LIMIT};
use super::client::RetroAchievementsClient;
use super::sample::{sample_games, SampleRequest, DEFAULT_REFILL_ATTEMPTS};
use super::systems::{match_system, SystemAliases};
use super::types::{CatalogStats, Game, GameDetails, System};
use crate::cache;
use crate::error::{Result, TroopaError};

/// Tunables for catalog building and sampling
#[derive(Debug, Clone)]
pub struct LibrarySettings {
    /// Systems with an id at or above this are skipped
    pub system_id_limit: u32,
    /// Redraw budget when replacing hacks
    pub refill_attempts: usize,
    /// Pause between requests during a cache rebuild
    pub rate_limit_delay: Duration,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            system_id_limit: DEFAULT_SYSTEM_ID_LIMIT,
            refill_attempts: DEFAULT_REFILL_ATTEMPTS,
            rate_limit_delay: Duration::from_secs(1),
        }
    }
}

/// Catalog together with the system list it was built from
#[derive(Debug)]
struct Loaded {
    catalog: Catalog,
    systems: Vec<System>,
    /// mtime of the system list file at build time
    version: Option<SystemTime>,
}

/// Outcome of a successful cache rebuild
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateSummary {
    pub systems: usize,
    pub games: usize,
    pub with_achievements: usize,
}

pub struct GameLibrary {
    client: RetroAchievementsClient,
    rules: ExclusionRules,
    aliases: SystemAliases,
    settings: LibrarySettings,
    loaded: Option<Loaded>,
}

impl GameLibrary {
    pub fn new(
        client: RetroAchievementsClient,
        rules: ExclusionRules,
        aliases: SystemAliases,
        settings: LibrarySettings,
    ) -> Self {
        debug!(
            mature_games = rules.mature_count(),
            aliases = aliases.len(),
            "game library configured"
        );
        Self {
            client,
            rules,
            aliases,
            settings,
            loaded: None,
        }
    }

    pub fn client(&self) -> &RetroAchievementsClient {
        &self.client
    }

    pub fn settings(&self) -> &LibrarySettings {
        &self.settings
    }

    /// Systems list, straight from the client (cached on disk)
    pub fn list_systems(&self) -> Result<Vec<System>> {
        self.client.list_systems()
    }

    /// Raw game list of one system, including excluded and empty games
    pub fn list_games(&self, system_id: u32) -> Result<Vec<Game>> {
        self.client.list_games(system_id)
    }

    fn cache_version(&self) -> Option<SystemTime> {
        std::fs::metadata(self.client.systems_file())
            .and_then(|m| m.modified())
            .ok()
    }

    fn build(&self, client: &RetroAchievementsClient) -> Result<Loaded> {
        let systems = client.list_systems()?;
        let catalog = Catalog::build(client, &systems, &self.rules, self.settings.system_id_limit)?;
        let version = std::fs::metadata(client.systems_file())
            .and_then(|m| m.modified())
            .ok();

        Ok(Loaded {
            catalog,
            systems,
            version,
        })
    }

    /// Build the catalog unless the cache is unchanged since the last build
    fn load(&mut self) -> Result<&Loaded> {
        let version = self.cache_version();
        let fresh = matches!(&self.loaded, Some(l) if version.is_some() && l.version == version);

        let loaded = match self.loaded.take() {
            Some(previous) if fresh => previous,
            previous => {
                info!(cache_dir = %self.client.cache_dir().display(), "loading catalog");
                match self.build(&self.client) {
                    Ok(loaded) => {
                        debug!(
                            games = loaded.catalog.len(),
                            with_achievements = loaded.catalog.with_achievements_len(),
                            "catalog loaded"
                        );
                        loaded
                    }
                    Err(e) => {
                        self.loaded = previous;
                        return Err(e);
                    }
                }
            }
        };

        Ok(self.loaded.insert(loaded))
    }

    /// The current catalog, loading it if needed
    pub fn catalog(&mut self) -> Result<&Catalog> {
        Ok(&self.load()?.catalog)
    }

    /// All games, or only those with achievements
    pub fn full_gamelist(&mut self, allow_empty: bool) -> Result<&[Game]> {
        Ok(self.catalog()?.games(allow_empty))
    }

    /// Draw random games according to `request`
    pub fn random_games(&mut self, request: &SampleRequest) -> Result<Vec<Game>> {
        let refills = self.settings.refill_attempts;
        let catalog = self.catalog()?;
        let games = sample_games(catalog, request, refills, &mut rand::thread_rng())?;
        Ok(games)
    }

    /// Per-system counts
    pub fn stats(&mut self) -> Result<CatalogStats> {
        Ok(self.catalog()?.stats())
    }

    /// Best matching game system for a user-typed name
    pub fn match_system(&mut self, query: &str) -> Result<Option<System>> {
        let limit = self.settings.system_id_limit;
        let loaded = self.load()?;
        let game_systems: Vec<System> = loaded
            .systems
            .iter()
            .filter(|s| s.id < limit)
            .cloned()
            .collect();

        Ok(match_system(&game_systems, &self.aliases, query).cloned())
    }

    /// Resolve several names to system ids; `None` for an empty list
    pub fn resolve_systems<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Option<HashSet<u32>>> {
        if names.is_empty() {
            return Ok(None);
        }

        let mut ids = HashSet::new();
        for name in names {
            let name = name.as_ref();
            let system = self
                .match_system(name)?
                .ok_or_else(|| TroopaError::UnknownSystem(name.to_string()))?;
            debug!(query = name, system = %system.name, "resolved system");
            ids.insert(system.id);
        }
        Ok(Some(ids))
    }

    /// Details for a game, or `None` if the lookup keeps failing
    pub fn game_details(&self, game_id: u32) -> Option<GameDetails> {
        self.client.try_game_details(game_id)
    }

    /// Refetch every list into a staging directory and swap it in.
    ///
    /// The live cache directory and the in-memory catalog are left untouched
    /// unless every request succeeds.
    pub fn update_cache(&mut self) -> Result<UpdateSummary> {
        let live = normalize(self.client.cache_dir());
        let staging = sibling(&live, ".update");
        cache::clear_all(&staging)?;

        let staging_client = self.client.with_cache_dir(&staging);
        let mut loaded = match self.populate(&staging_client) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(error = %e, "cache update failed, keeping previous cache");
                if let Err(cleanup) = cache::clear_all(&staging) {
                    warn!(error = %cleanup, path = %staging.display(), "could not remove staging directory");
                }
                return Err(e);
            }
        };

        swap_dirs(&staging, &live)?;
        loaded.version = self.cache_version();

        let summary = UpdateSummary {
            systems: loaded.systems.len(),
            games: loaded.catalog.len(),
            with_achievements: loaded.catalog.with_achievements_len(),
        };
        info!(
            games = summary.games,
            with_achievements = summary.with_achievements,
            "cache updated"
        );
        self.loaded = Some(loaded);

        Ok(summary)
    }

    fn populate(&self, client: &RetroAchievementsClient) -> Result<Loaded> {
        let systems = client.list_systems()?;
        for system in &systems {
            std::thread::sleep(self.settings.rate_limit_delay);
            let games = client.list_games(system.id)?;
            info!(
                system_id = system.id,
                system = %system.name,
                games = games.len(),
                "updated system"
            );
        }
        self.build(client)
    }
}

/// Drop trailing separators so suffixing yields a sibling, not a child
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Replace `live` with `staging` using renames only
///
/// The previous directory is parked next to `live` and put back if the
/// second rename fails. Between the two renames `live` does not exist: a
/// reader in this process is excluded by `&mut self`, but another process
/// opening the cache in that window sees it missing, and if it starts
/// fetching into `live` the rename and the restore both fail. Run updates
/// while no other instance is using the same cache directory.
fn swap_dirs(staging: &Path, live: &Path) -> Result<()> {
    let retired = sibling(live, ".old");
    cache::clear_all(&retired)?;

    let had_live = live.exists();
    if had_live {
        std::fs::rename(live, &retired)?;
    }
    if let Err(e) = std::fs::rename(staging, live) {
        if had_live {
            std::fs::rename(&retired, live)?;
        }
        return Err(e.into());
    }
    if had_live {
        cache::clear_all(&retired)?;
    }

    debug!(path = %live.display(), "cache directory replaced");
    Ok(())
}
