//! HTML pages for the web frontend
//!
//! Pages are served below the base path with a trailing slash, so every
//! link here is relative (`random`, `any`, `stats`).

use super::{FlashEntry, GameEntry};
use crate::retroachievements::{CatalogStats, GameDetails};

const NAV: &str = r#"    <div><a href="random">go here for a random game with achievements</a></div>
    <div><a href="any">go here for any random game</a></div>"#;

/// Escape text for use in element content and quoted attributes
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn page(title: &str, head: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n  <head>\n    <meta charset=\"utf-8\" />\n    <title>{}</title>\n{head}  </head>\n  <body>\n{body}\n  </body>\n</html>\n",
        escape(title)
    )
}

pub fn index_page(total: usize, with_achievements: usize) -> String {
    let body = format!(
        "    <h1>TrophyTroopa Random Games Bot</h1>\n    <div>games with achievements: {with_achievements}</div>\n    <div>total games: {total}</div>\n{NAV}\n    <div><a href=\"stats\">per-system statistics</a></div>"
    );
    page("TrophyTroopa Random Games Bot", "", &body)
}

/// Page for one drawn game, with OpenGraph tags so links unfurl in chat
pub fn game_page(game: &GameEntry, details: Option<&GameDetails>, screenshot_url: Option<&str>) -> String {
    let title = escape(&game.title);
    let system = escape(&game.system);
    let url = escape(&game.url);
    let icon = escape(&game.icon_url);

    let head = format!(
        "    <meta property=\"og:title\" content=\"{title}\" />\n    <meta property=\"og:description\" content=\"{title} ({system}), {} achievements\" />\n    <meta property=\"og:type\" content=\"website\" />\n    <meta property=\"og:url\" content=\"{url}\" />\n    <meta property=\"og:image\" content=\"{icon}\" />\n",
        game.achievements
    );

    let mut body = format!(
        "    <img src=\"{icon}\" />\n    <div>Game: {title}</div>\n    <div>System: {system}</div>\n"
    );
    if let Some(details) = details {
        for (label, value) in [
            ("Developer", &details.developer),
            ("Publisher", &details.publisher),
            ("Genre", &details.genre),
            ("Released", &details.released),
        ] {
            if let Some(value) = value.as_deref().filter(|v| !v.is_empty()) {
                body.push_str(&format!("    <div>{label}: {}</div>\n", escape(value)));
            }
        }
    }
    body.push_str(&format!(
        "    <div>Achievements: {}</div>\n",
        game.achievements
    ));
    if let Some(screenshot) = screenshot_url {
        body.push_str(&format!("    <img src=\"{}\" />\n", escape(screenshot)));
    }
    body.push_str(&format!("    <a href=\"{url}\">game page</a>\n{NAV}"));

    page(&format!("TrophyTroopa Pull: {}", game.title), &head, &body)
}

pub fn stats_page(stats: &CatalogStats) -> String {
    let mut body = String::from(
        "    <h1>Catalog statistics</h1>\n    <table>\n      <tr><th>System</th><th>Games</th><th>With achievements</th></tr>\n",
    );
    for system in &stats.systems {
        body.push_str(&format!(
            "      <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            escape(&system.name),
            system.total,
            system.with_achievements
        ));
    }
    body.push_str(&format!(
        "      <tr><th>Total</th><th>{}</th><th>{}</th></tr>\n    </table>\n{NAV}",
        stats.total, stats.with_achievements
    ));
    page("TrophyTroopa - Statistics", "", &body)
}

pub fn flash_page(game: &FlashEntry) -> String {
    let title = escape(&game.title);
    let url = escape(&game.url);
    let logo = escape(&game.logo_url);

    let head = format!(
        "    <meta property=\"og:title\" content=\"{title}\" />\n    <meta property=\"og:description\" content=\"{title} ({})\" />\n    <meta property=\"og:type\" content=\"website\" />\n    <meta property=\"og:url\" content=\"{url}\" />\n    <meta property=\"og:image\" content=\"{logo}\" />\n",
        escape(&game.platform)
    );
    let body = format!(
        "    <img src=\"{logo}\" />\n    <div>Game: {title}</div>\n    <div>Platform: {}</div>\n    <img src=\"{}\" />\n    <a href=\"{url}\">database entry</a>",
        escape(&game.platform),
        escape(&game.screenshot_url)
    );

    page(&format!("TrophyTroopa Flashpoint Pull: {}", game.title), &head, &body)
}

pub fn tos_page() -> String {
    page(
        "TrophyTroopa - Terms of Service",
        "",
        "    Use of the TrophyTroopa bot is only allowed with the express permission of the developer.",
    )
}

pub fn privacy_page() -> String {
    page(
        "TrophyTroopa - Privacy Policy",
        "",
        "    The TrophyTroopa bot does not store or use any personal data. Any personal data potentially received from the Discord API is ignored.",
    )
}

/// Minimal error page
pub fn error_page(message: &str) -> String {
    page(
        "TrophyTroopa - Error",
        "",
        &format!("    <div>{}</div>\n{NAV}", escape(message)),
    )
}
