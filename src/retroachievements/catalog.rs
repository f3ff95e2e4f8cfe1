//! In-memory game catalog built from the cached per-system game lists

use std::collections::HashSet;

use serde::Deserialize;

use super::client::RetroAchievementsClient;
use super::types::{CatalogStats, Game, System, SystemStats};
use crate::error::Result;

/// System ids at or above this are hubs, events and other non-platforms
pub const DEFAULT_SYSTEM_ID_LIMIT: u32 = 100;

/// Curated list of mature-content game ids, scraped from the site's mature hub
const DEFAULT_MATURE_GAMES: &str = include_str!("../../data/mature_games.json");

/// Marker opening the bracketed suffix of subset titles, e.g. `[Subset - Bonus]`
const SUBSET_MARKER: &str = "[Subset";

/// Games that never enter the catalog
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    mature_games: HashSet<u32>,
}

#[derive(Deserialize)]
struct MatureGamesFile {
    games: Vec<u32>,
}

impl ExclusionRules {
    pub fn new(mature_games: impl IntoIterator<Item = u32>) -> Self {
        Self {
            mature_games: mature_games.into_iter().collect(),
        }
    }

    /// Parse a `{"games": [id, ...]}` document
    pub fn from_json(json: &str) -> Result<Self> {
        let file: MatureGamesFile = serde_json::from_str(json)?;
        Ok(Self::new(file.games))
    }

    /// Rules shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(DEFAULT_MATURE_GAMES)
    }

    pub fn mature_count(&self) -> usize {
        self.mature_games.len()
    }

    pub fn is_excluded(&self, game: &Game) -> bool {
        self.mature_games.contains(&game.id) || is_subset_title(&game.title)
    }
}

/// True if `title` ends in a bracketed `[Subset ...]` suffix
///
/// The suffix needs at least one character after the marker and may not
/// contain another closing bracket.
pub fn is_subset_title(title: &str) -> bool {
    let Some(body) = title.strip_suffix(']') else {
        return false;
    };
    let tail = match body.rfind(']') {
        Some(i) => &body[i + 1..],
        None => body,
    };

    tail.match_indices(SUBSET_MARKER)
        .any(|(i, marker)| tail.len() > i + marker.len())
}

/// All known games, plus the subset that has achievements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    all: Vec<Game>,
    with_achievements: Vec<Game>,
}

impl Catalog {
    /// Build from system game lists, in the order given
    pub fn from_game_lists<I>(lists: I, rules: &ExclusionRules) -> Self
    where
        I: IntoIterator<Item = Vec<Game>>,
    {
        let mut catalog = Self::default();
        for game in lists.into_iter().flatten() {
            if rules.is_excluded(&game) {
                continue;
            }
            if game.has_achievements() {
                catalog.with_achievements.push(game.clone());
            }
            catalog.all.push(game);
        }
        catalog
    }

    /// Fetch (or read from cache) every game system's list and build from it
    pub fn build(
        client: &RetroAchievementsClient,
        systems: &[System],
        rules: &ExclusionRules,
        system_id_limit: u32,
    ) -> Result<Self> {
        let lists = systems
            .iter()
            .filter(|s| s.id < system_id_limit)
            .map(|s| client.list_games(s.id))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_game_lists(lists, rules))
    }

    /// Every game, or only those with achievements
    pub fn games(&self, allow_empty: bool) -> &[Game] {
        if allow_empty {
            &self.all
        } else {
            &self.with_achievements
        }
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn with_achievements_len(&self) -> usize {
        self.with_achievements.len()
    }

    /// Per-system totals in first-seen order
    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats::default();

        for game in &self.all {
            let has = usize::from(game.has_achievements());
            match stats.systems.iter_mut().find(|s| s.name == game.console_name) {
                Some(entry) => {
                    entry.total += 1;
                    entry.with_achievements += has;
                }
                None => stats.systems.push(SystemStats {
                    name: game.console_name.clone(),
                    total: 1,
                    with_achievements: has,
                }),
            }
            stats.total += 1;
            stats.with_achievements += has;
        }

        stats
    }
}
