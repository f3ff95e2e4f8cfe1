//! Cache management commands

use chrono::Local;
use colored::Colorize;

use crate::cache;
use crate::cli::args::{CacheArgs, CacheCommands, OutputFormat};
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;

/// Handle cache commands
pub fn cache(
    config: &Config,
    context: &AppContext,
    args: &CacheArgs,
    format: OutputFormat,
) -> Result<String> {
    match &args.command {
        CacheCommands::Status => status(config, context, format),
        CacheCommands::Clear => clear(config, format),
    }
}

fn status(config: &Config, context: &AppContext, format: OutputFormat) -> Result<String> {
    let catalog_dir = &config.catalog.cache_dir;
    let status = cache::status(catalog_dir);
    let age_secs = status
        .updated_at
        .map(|t| (Local::now() - t).num_seconds().max(0) as u64);
    let collections: Vec<(&str, bool)> = context
        .flashpoint
        .iter()
        .map(|c| (c.name(), c.cache_file().exists()))
        .collect();

    match format {
        OutputFormat::Pretty => {
            let mut output = String::new();
            output.push_str(&format!("{}\n", "Cache Status".bold()));
            output.push_str(&format!("Location: {}\n\n", catalog_dir.display()));

            output.push_str(&"Catalog:\n".dimmed().to_string());
            if status.exists {
                if let Some(count) = status.gamelists {
                    output.push_str(&format!("  Systems cached: {}\n", count));
                }
                if let (Some(updated_at), Some(age)) = (status.updated_at, age_secs) {
                    output.push_str(&format!(
                        "  Updated: {} ({} ago)\n",
                        updated_at.format("%Y-%m-%d %H:%M"),
                        format_age(age)
                    ));
                }
            } else {
                output.push_str(&format!(
                    "  {} (run '{}')\n",
                    "Not cached".yellow(),
                    "trophytroopa update".cyan()
                ));
            }

            if !collections.is_empty() {
                output.push_str(&format!(
                    "\n{}\n",
                    format!("Flashpoint ({}):", config.catalog.flashpoint_cache_dir.display()).dimmed()
                ));
                for (name, cached) in &collections {
                    let state = if *cached {
                        "cached".green()
                    } else {
                        "not cached".dimmed()
                    };
                    output.push_str(&format!("  {}: {}\n", name, state));
                }
            }

            Ok(output.trim_end().to_string())
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "cache_dir": catalog_dir.to_string_lossy(),
                "catalog": {
                    "exists": status.exists,
                    "gamelists": status.gamelists,
                    "updated_at": status.updated_at.map(|t| t.to_rfc3339()),
                    "age_secs": age_secs,
                },
                "flashpoint": collections
                    .iter()
                    .map(|(name, cached)| serde_json::json!({"name": name, "cached": cached}))
                    .collect::<Vec<_>>(),
            });
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}

fn clear(config: &Config, format: OutputFormat) -> Result<String> {
    cache::clear_all(&config.catalog.cache_dir)?;
    cache::clear_all(&config.catalog.flashpoint_cache_dir)?;

    match format {
        OutputFormat::Pretty => Ok(format!("{} Cache cleared", "✓".green())),
        OutputFormat::Json => {
            let json = serde_json::json!({
                "status": "cleared"
            });
            Ok(serde_json::to_string_pretty(&json)?)
        }
    }
}

/// Format age in human-readable form
fn format_age(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}
