use std::io::{self, Write};

use colored::Colorize;

use crate::cli::args::{ConfigArgs, ConfigCommands, OutputFormat};
use crate::config::{mask_secret, Config, Paths};
use crate::error::{Result, TroopaError};

/// Handle the config command
pub fn config(
    config: &mut Config,
    paths: &Paths,
    args: &ConfigArgs,
    format: OutputFormat,
) -> Result<String> {
    match &args.command {
        ConfigCommands::Show => config_show(config, format),
        ConfigCommands::Set { key, value } => config_set(config, paths, key, value, format),
        ConfigCommands::Path => config_path(paths, format),
        ConfigCommands::Init => config_init(config, paths, format),
    }
}

/// Copy of the config with secrets masked
fn masked(config: &Config) -> Config {
    let mut safe_config = config.clone();
    if let Some(ref key) = safe_config.retroachievements.api_key {
        safe_config.retroachievements.api_key = Some(mask_secret(key));
    }
    safe_config
}

fn not_set() -> String {
    "(not set)".dimmed().to_string()
}

/// Show current configuration
fn config_show(config: &Config, format: OutputFormat) -> Result<String> {
    let safe_config = masked(config);

    match format {
        OutputFormat::Pretty => {
            let ra = &safe_config.retroachievements;
            let catalog = &safe_config.catalog;
            let mut output = String::new();
            output.push_str(&format!("{}\n", "Configuration".bold()));
            output.push_str(&"─".repeat(40));
            output.push('\n');

            output.push_str(&format!("\n{}\n", "[retroachievements]".cyan()));
            output.push_str(&format!(
                "  api_user = {}\n",
                ra.api_user.clone().unwrap_or_else(not_set)
            ));
            output.push_str(&format!(
                "  api_key = {}\n",
                ra.api_key.clone().unwrap_or_else(not_set)
            ));
            if let Some(ref base_url) = ra.base_url {
                output.push_str(&format!("  base_url = {}\n", base_url));
            }

            output.push_str(&format!("\n{}\n", "[catalog]".cyan()));
            output.push_str(&format!("  cache_dir = {}\n", catalog.cache_dir.display()));
            output.push_str(&format!(
                "  flashpoint_cache_dir = {}\n",
                catalog.flashpoint_cache_dir.display()
            ));
            if let Some(ref api_url) = catalog.flashpoint_api_url {
                output.push_str(&format!("  flashpoint_api_url = {}\n", api_url));
            }
            output.push_str(&format!("  system_id_limit = {}\n", catalog.system_id_limit));
            output.push_str(&format!("  refill_attempts = {}\n", catalog.refill_attempts));
            output.push_str(&format!(
                "  rate_limit_delay_ms = {}\n",
                catalog.rate_limit_delay_ms
            ));
            output.push_str(&format!("  retry_delay_ms = {}\n", catalog.retry_delay_ms));

            output.push_str(&format!("\n{}\n", "[discord]".cyan()));
            output.push_str(&format!(
                "  app_id = {}\n",
                safe_config.discord.app_id.clone().unwrap_or_else(not_set)
            ));
            output.push_str(&format!(
                "  public_key = {}\n",
                safe_config.discord.public_key.clone().unwrap_or_else(not_set)
            ));

            output.push_str(&format!("\n{}\n", "[server]".cyan()));
            output.push_str(&format!("  bind = {}\n", safe_config.server.bind));
            output.push_str(&format!("  base_path = {}\n", safe_config.server.base_path));

            for instance in &safe_config.flashpoint {
                output.push_str(&format!("\n{}\n", "[[flashpoint]]".cyan()));
                output.push_str(&format!("  name = {}\n", instance.name));
                output.push_str(&format!("  filter = {}\n", instance.filter));
            }

            Ok(output)
        }
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&safe_config)?),
    }
}

/// Set a configuration value
fn config_set(
    config: &mut Config,
    paths: &Paths,
    key: &str,
    value: &str,
    format: OutputFormat,
) -> Result<String> {
    config.set(key, value)?;
    config.save_to(paths)?;

    let shown = if key.ends_with("api_key") {
        mask_secret(value)
    } else {
        value.to_string()
    };

    match format {
        OutputFormat::Pretty => Ok(format!("{} Set {} = {}", "✓".green(), key, shown)),
        OutputFormat::Json => {
            let result = serde_json::json!({
                "success": true,
                "key": key,
                "value": shown
            });
            Ok(serde_json::to_string_pretty(&result)?)
        }
    }
}

/// Show configuration file path
fn config_path(paths: &Paths, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Pretty => {
            let mut output = String::new();
            output.push_str(&format!("Config file: {}\n", paths.config_file.display()));
            output.push_str(&format!(
                "Exists: {}\n",
                if paths.config_exists() {
                    "yes".green()
                } else {
                    "no".yellow()
                }
            ));
            Ok(output)
        }
        OutputFormat::Json => {
            let result = serde_json::json!({
                "path": paths.config_file.display().to_string(),
                "exists": paths.config_exists()
            });
            Ok(serde_json::to_string_pretty(&result)?)
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Initialize configuration interactively
fn config_init(config: &mut Config, paths: &Paths, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return Err(TroopaError::InvalidArgument(
            "config init requires interactive mode (--output pretty)".to_string(),
        ));
    }

    println!("{}", "TrophyTroopa Configuration".bold());
    println!("{}", "─".repeat(40));
    println!();

    let user = prompt("RetroAchievements username: ")?;
    if user.is_empty() {
        return Err(TroopaError::InvalidArgument(
            "username cannot be empty".to_string(),
        ));
    }

    let key = rpassword::prompt_password("RetroAchievements web API key: ")?;
    let key = key.trim().to_string();
    if key.is_empty() {
        return Err(TroopaError::InvalidArgument(
            "API key cannot be empty".to_string(),
        ));
    }

    let public_key = prompt("Discord public key (optional, Enter to skip): ")?;

    config.retroachievements.api_user = Some(user);
    config.retroachievements.api_key = Some(key);
    if !public_key.is_empty() {
        config.set("discord.public_key", &public_key)?;
    }
    config.save_to(paths)?;

    Ok(format!(
        "\n{} Configuration saved to: {}\n\nRun '{}' to download the catalog.",
        "✓".green(),
        paths.config_file.display(),
        "trophytroopa update".cyan()
    ))
}
