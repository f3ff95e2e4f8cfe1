use colored::Colorize;

use super::{FlashEntry, GameEntry};
use crate::retroachievements::{CatalogStats, System, UpdateSummary};

/// Safely truncate a string to n characters, appending "..." if truncated.
/// Works correctly with multi-byte UTF-8 characters.
fn truncate_str(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() > max_chars {
        let truncated: String = chars.iter().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

/// Format drawn games for pretty output
pub fn format_games(games: &[GameEntry]) -> String {
    if games.is_empty() {
        return "No games found.".to_string();
    }

    let mut output = String::new();
    for game in games {
        let achievements = if game.achievements > 0 {
            format!("{} achievements", game.achievements).green()
        } else {
            "no achievements".yellow()
        };

        output.push_str(&format!("{} [{}]\n", game.title.bold(), achievements));
        output.push_str(&format!("  {} {}\n", "System:".cyan(), game.system));
        output.push_str(&format!("  {} {}\n", "ID:".cyan(), game.id));
        output.push_str(&format!("  {} {}\n", "URL:".cyan(), game.url.dimmed()));
        output.push('\n');
    }

    output.trim_end().to_string()
}

/// Format per-system counts as a table
pub fn format_stats(stats: &CatalogStats) -> String {
    if stats.systems.is_empty() {
        return "Catalog is empty. Run 'trophytroopa update' to fetch it.".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<32} {:>8} {:>8}\n",
        "System".bold(),
        "Games".bold(),
        "Trophy".bold()
    ));
    output.push_str(&"─".repeat(50));
    output.push('\n');

    for system in &stats.systems {
        output.push_str(&format!(
            "{:<32} {:>8} {:>8}\n",
            truncate_str(&system.name, 32),
            system.total,
            system.with_achievements
        ));
    }

    output.push_str(&"─".repeat(50));
    output.push('\n');
    output.push_str(&format!(
        "{:<32} {:>8} {:>8}",
        "Total".bold(),
        stats.total,
        stats.with_achievements.to_string().green()
    ));

    output
}

/// Format a list of systems for pretty output
pub fn format_systems(systems: &[System]) -> String {
    if systems.is_empty() {
        return "No systems found.".to_string();
    }

    systems
        .iter()
        .map(|s| format!("{:>4}  {}", s.id.to_string().dimmed(), s.name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format the outcome of a system lookup
pub fn format_system_match(query: &str, system: Option<&System>) -> String {
    match system {
        Some(system) => format!(
            "{} {} {} ({})",
            query.cyan(),
            "→".dimmed(),
            system.name.bold(),
            system.id
        ),
        None => format!("No system matches '{}'", query),
    }
}

/// Format a Flashpoint pick for pretty output
pub fn format_flash_game(entry: &FlashEntry) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", entry.title.bold()));
    output.push_str(&format!("  {} {}\n", "Platform:".cyan(), entry.platform));
    output.push_str(&format!("  {} {}\n", "ID:".cyan(), entry.id));
    output.push_str(&format!("  {} {}\n", "URL:".cyan(), entry.url.dimmed()));
    output.push_str(&format!("  {} {}", "Screenshot:".cyan(), entry.screenshot_url.dimmed()));
    output
}

/// Format a cache rebuild summary
pub fn format_update(summary: &UpdateSummary) -> String {
    format!(
        "{} Cache updated: {} systems, {} games ({} with achievements)",
        "✓".green(),
        summary.systems,
        summary.games,
        summary.with_achievements
    )
}
