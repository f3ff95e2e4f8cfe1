pub mod html;
pub mod json;
pub mod pretty;

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::flashpoint::{FlashGame, FlashpointClient};
use crate::retroachievements::{
    CatalogStats, Game, RetroAchievementsClient, System, UpdateSummary,
};

/// A drawn game with its links resolved, as shown to users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameEntry {
    pub id: u32,
    pub title: String,
    pub system: String,
    pub achievements: u32,
    pub url: String,
    pub icon_url: String,
}

impl GameEntry {
    pub fn new(client: &RetroAchievementsClient, game: &Game) -> Self {
        Self {
            id: game.id,
            title: game.title.clone(),
            system: game.console_name.clone(),
            achievements: game.num_achievements,
            url: client.make_game_url(game.id),
            icon_url: client.make_full_url(&game.image_icon),
        }
    }
}

/// A Flashpoint pick with its links resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlashEntry {
    pub id: String,
    pub title: String,
    pub platform: String,
    pub url: String,
    pub logo_url: String,
    pub screenshot_url: String,
}

impl FlashEntry {
    pub fn new(client: &FlashpointClient, game: &FlashGame) -> Result<Self> {
        Ok(Self {
            id: game.id.clone(),
            title: game.title.clone(),
            platform: game.platform.clone(),
            url: client.make_db_url(&game.id),
            logo_url: client.make_logo_url(&game.id)?,
            screenshot_url: client.make_screenshot_url(&game.id)?,
        })
    }
}

/// Format drawn games based on output format
pub fn format_games(games: &[GameEntry], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_games(games)),
        OutputFormat::Json => json::format_json(games),
    }
}

/// Format catalog statistics based on output format
pub fn format_stats(stats: &CatalogStats, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_stats(stats)),
        OutputFormat::Json => json::format_json(stats),
    }
}

/// Format a list of systems based on output format
pub fn format_systems(systems: &[System], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_systems(systems)),
        OutputFormat::Json => json::format_systems(systems),
    }
}

/// Format the result of `match_system` based on output format
pub fn format_system_match(
    query: &str,
    system: Option<&System>,
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_system_match(query, system)),
        OutputFormat::Json => json::format_system_match(query, system),
    }
}

/// Format a Flashpoint pick based on output format
pub fn format_flash_game(entry: &FlashEntry, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_flash_game(entry)),
        OutputFormat::Json => json::format_json(entry),
    }
}

/// Format a cache rebuild summary based on output format
pub fn format_update(summary: &UpdateSummary, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => Ok(pretty::format_update(summary)),
        OutputFormat::Json => json::format_update(summary),
    }
}
