use super::types::{Embed, EmbedImage};
use crate::error::Result;
use crate::flashpoint::{FlashGame, FlashpointClient};
use crate::retroachievements::{Game, GameDetails, RetroAchievementsClient};

/// The two RetroAchievements brand colours, alternated across embeds
pub const EMBED_COLORS: [u32; 2] = [0x1066dd, 0xcc9a00];

/// Colour for the embed at `index` in a reply
pub fn embed_color(index: usize) -> u32 {
    EMBED_COLORS[index % EMBED_COLORS.len()]
}

/// `**Label:** value` lines for the details we actually have
fn detail_lines(details: &GameDetails) -> String {
    [
        ("Developer", &details.developer),
        ("Publisher", &details.publisher),
        ("Genre", &details.genre),
        ("Released", &details.released),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(|v| format!("**{label}:** {v}\n"))
    })
    .collect()
}

/// Rich embed for one RetroAchievements game
pub fn game_embed(
    client: &RetroAchievementsClient,
    game: &Game,
    details: Option<&GameDetails>,
    color: u32,
) -> Embed {
    let mut description = format!("**System:** {}\n", game.console_name);
    if let Some(details) = details {
        description.push_str(&detail_lines(details));
    }
    description.push_str(&format!("**Achievements:** {}", game.num_achievements));

    let image = details
        .and_then(|d| d.image_ingame.as_deref())
        .filter(|path| !path.is_empty())
        .map(|path| EmbedImage::new(client.make_full_url(path)));

    Embed {
        kind: "rich".to_string(),
        title: game.title.clone(),
        description,
        color,
        url: client.make_game_url(game.id),
        thumbnail: Some(EmbedImage::new(client.make_full_url(&game.image_icon))),
        image,
    }
}

/// Rich embed for one Flashpoint game
pub fn flash_embed(client: &FlashpointClient, game: &FlashGame, color: u32) -> Result<Embed> {
    Ok(Embed {
        kind: "rich".to_string(),
        title: game.title.clone(),
        description: format!("**Platform:** {}", game.platform),
        color,
        url: client.make_db_url(&game.id),
        thumbnail: Some(EmbedImage::new(client.make_logo_url(&game.id)?)),
        image: Some(EmbedImage::new(client.make_screenshot_url(&game.id)?)),
    })
}
