//! Random game selection

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use super::catalog::Catalog;
use super::types::Game;

/// Title marker the site uses for romhacks
pub const HACK_MARKER: &str = "~Hack~";

/// How many refill rounds may be spent replacing removed hacks
pub const DEFAULT_REFILL_ATTEMPTS: usize = 10;

/// Why a selection could not be made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error("Not enough games to pick from: requested {requested}, only {available} available")]
    InsufficientPool { requested: usize, available: usize },

    #[error("Gave up after {attempts} redraws: found {found} of {requested} games that are not hacks")]
    RefillExhausted {
        requested: usize,
        found: usize,
        attempts: usize,
    },
}

/// What to draw from the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRequest {
    pub count: usize,
    /// Include games without achievements
    pub allow_empty: bool,
    /// Include romhacks
    pub allow_hacks: bool,
    /// Restrict to these system ids
    pub systems: Option<HashSet<u32>>,
}

impl Default for SampleRequest {
    fn default() -> Self {
        Self {
            count: 1,
            allow_empty: false,
            allow_hacks: true,
            systems: None,
        }
    }
}

impl SampleRequest {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }

    pub fn allow_hacks(mut self, allow: bool) -> Self {
        self.allow_hacks = allow;
        self
    }

    pub fn systems(mut self, systems: impl IntoIterator<Item = u32>) -> Self {
        self.systems = Some(systems.into_iter().collect());
        self
    }
}

pub fn is_hack(game: &Game) -> bool {
    game.title.contains(HACK_MARKER)
}

/// Draw `request.count` distinct games uniformly at random.
///
/// With hacks disallowed, drawn hacks are dropped and the gap is refilled
/// from the games in the pool that are neither hacks nor already picked.
/// The pool is checked for enough of those up front, so one refill always
/// suffices; `max_refills == 0` turns any drawn hack into an error.
pub fn sample_games<R: Rng + ?Sized>(
    catalog: &Catalog,
    request: &SampleRequest,
    max_refills: usize,
    rng: &mut R,
) -> Result<Vec<Game>, SampleError> {
    let count = request.count;
    let pool: Vec<&Game> = catalog
        .games(request.allow_empty)
        .iter()
        .filter(|g| {
            request
                .systems
                .as_ref()
                .map_or(true, |ids| ids.contains(&g.console_id))
        })
        .collect();

    if pool.len() < count {
        return Err(SampleError::InsufficientPool {
            requested: count,
            available: pool.len(),
        });
    }

    let mut picked: Vec<&Game> = pool.choose_multiple(rng, count).copied().collect();
    if request.allow_hacks {
        return Ok(picked.into_iter().cloned().collect());
    }

    let eligible = pool.iter().filter(|g| !is_hack(g)).count();
    if eligible < count {
        return Err(SampleError::InsufficientPool {
            requested: count,
            available: eligible,
        });
    }

    picked.retain(|g| !is_hack(g));
    let mut attempts = 0;
    while picked.len() < count {
        if attempts == max_refills {
            return Err(SampleError::RefillExhausted {
                requested: count,
                found: picked.len(),
                attempts,
            });
        }
        attempts += 1;

        let taken: HashSet<u32> = picked.iter().map(|g| g.id).collect();
        let candidates: Vec<&Game> = pool
            .iter()
            .copied()
            .filter(|g| !is_hack(g) && !taken.contains(&g.id))
            .collect();
        let missing = count - picked.len();
        picked.extend(candidates.choose_multiple(rng, missing).copied());
    }

    Ok(picked.into_iter().cloned().collect())
}
