mod catalog;
mod client;
mod library;
mod sample;
mod systems;
pub mod types;

pub use catalog::{is_subset_title, Catalog, ExclusionRules, DEFAULT_SYSTEM_ID_LIMIT};
pub use client::{RetroAchievementsClient, DEFAULT_BASE_URL};
pub use library::{GameLibrary, LibrarySettings, UpdateSummary};
pub use sample::{
    is_hack, sample_games, SampleError, SampleRequest, DEFAULT_REFILL_ATTEMPTS, HACK_MARKER,
};
pub use systems::{match_system, SystemAliases};
pub use types::*;

#[cfg(test)]
pub(crate) use catalog::tests as catalog_fixture;
#[cfg(test)]
pub(crate) use library::tests as library_fixture;
