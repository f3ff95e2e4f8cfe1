use serde::{Deserialize, Serialize};
use std::fs;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::paths::Paths;
use crate::error::{Result, TroopaError};
use crate::retroachievements::{
    ExclusionRules, LibrarySettings, SystemAliases, DEFAULT_REFILL_ATTEMPTS,
    DEFAULT_SYSTEM_ID_LIMIT,
};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// RetroAchievements API access
    #[serde(default)]
    pub retroachievements: RetroAchievementsConfig,

    /// Local cache and catalog tuning
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Discord application
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Web frontend
    #[serde(default)]
    pub server: ServerConfig,

    /// Flashpoint collections, first one is the default
    #[serde(default)]
    pub flashpoint: Vec<FlashpointInstance>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetroAchievementsConfig {
    /// Username sent as `z`
    pub api_user: Option<String>,
    /// Web API key sent as `y`
    pub api_key: Option<String>,
    /// Site root override
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_flashpoint_cache_dir")]
    pub flashpoint_cache_dir: PathBuf,
    /// Flashpoint search API root override
    pub flashpoint_api_url: Option<String>,
    #[serde(default = "default_system_id_limit")]
    pub system_id_limit: u32,
    #[serde(default = "default_refill_attempts")]
    pub refill_attempts: usize,
    #[serde(default = "default_delay_ms")]
    pub rate_limit_delay_ms: u64,
    #[serde(default = "default_delay_ms")]
    pub retry_delay_ms: u64,
    /// Replaces the built-in mature game list
    pub mature_games_file: Option<PathBuf>,
    /// Replaces the built-in system aliases
    pub system_aliases_file: Option<PathBuf>,
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("db")
}

fn default_flashpoint_cache_dir() -> PathBuf {
    PathBuf::from("flashpointdb")
}

fn default_system_id_limit() -> u32 {
    DEFAULT_SYSTEM_ID_LIMIT
}

fn default_refill_attempts() -> usize {
    DEFAULT_REFILL_ATTEMPTS
}

fn default_delay_ms() -> u64 {
    1000
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            flashpoint_cache_dir: default_flashpoint_cache_dir(),
            flashpoint_api_url: None,
            system_id_limit: default_system_id_limit(),
            refill_attempts: default_refill_attempts(),
            rate_limit_delay_ms: default_delay_ms(),
            retry_delay_ms: default_delay_ms(),
            mature_games_file: None,
            system_aliases_file: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiscordConfig {
    pub app_id: Option<String>,
    /// Hex-encoded ed25519 public key from the developer portal
    pub public_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Mount point of all pages, without trailing slash
    #[serde(default = "default_base_path")]
    pub base_path: String,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_base_path() -> String {
    "/trophytroopa".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            base_path: default_base_path(),
        }
    }
}

/// One filtered Flashpoint database view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashpointInstance {
    pub name: String,
    /// Extra search query parameters, e.g. `library=arcade&platform=Flash`
    #[serde(default)]
    pub filter: String,
}

/// Keys accepted by `config set`
pub const SETTABLE_KEYS: &[&str] = &[
    "retroachievements.api_user",
    "retroachievements.api_key",
    "retroachievements.base_url",
    "catalog.cache_dir",
    "catalog.flashpoint_cache_dir",
    "catalog.flashpoint_api_url",
    "catalog.refill_attempts",
    "catalog.rate_limit_delay_ms",
    "catalog.retry_delay_ms",
    "discord.app_id",
    "discord.public_key",
    "server.bind",
    "server.base_path",
];

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let paths = Paths::new()?;
        Self::load_from(&paths)
    }

    /// Load configuration from a specific paths instance
    pub fn load_from(paths: &Paths) -> Result<Self> {
        if !paths.config_exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&paths.config_file)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific paths instance
    pub fn save_to(&self, paths: &Paths) -> Result<()> {
        paths.ensure_dirs()?;
        let contents = toml::to_string_pretty(self)?;
        fs::write(&paths.config_file, &contents)?;

        // Holds the API key
        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&paths.config_file, perms)?;
        }

        Ok(())
    }

    /// RetroAchievements username and key, or an error with instructions
    pub fn require_credentials(&self) -> Result<(&str, &str)> {
        let ra = &self.retroachievements;
        match (ra.api_user.as_deref(), ra.api_key.as_deref()) {
            (Some(user), Some(key)) => Ok((user, key)),
            _ => Err(TroopaError::config_missing(
                "RetroAchievements credentials not configured. Run 'trophytroopa config init' to set up.",
            )),
        }
    }

    /// Discord public key, required to accept interactions
    pub fn require_public_key(&self) -> Result<&str> {
        self.discord.public_key.as_deref().ok_or_else(|| {
            TroopaError::config_missing(
                "Discord public key not configured. Run 'trophytroopa config set discord.public_key <hex>'.",
            )
        })
    }

    /// Mature game list from the configured file, or the built-in one
    pub fn exclusion_rules(&self) -> Result<ExclusionRules> {
        match &self.catalog.mature_games_file {
            Some(path) => ExclusionRules::from_json(&read_data_file(path)?),
            None => ExclusionRules::builtin(),
        }
    }

    /// System aliases from the configured file, or the built-in ones
    pub fn system_aliases(&self) -> Result<SystemAliases> {
        match &self.catalog.system_aliases_file {
            Some(path) => SystemAliases::from_json(&read_data_file(path)?),
            None => SystemAliases::builtin(),
        }
    }

    pub fn library_settings(&self) -> LibrarySettings {
        LibrarySettings {
            system_id_limit: self.catalog.system_id_limit,
            refill_attempts: self.catalog.refill_attempts,
            rate_limit_delay: Duration::from_millis(self.catalog.rate_limit_delay_ms),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.catalog.retry_delay_ms)
    }

    /// Set a value by dotted key, validating numbers
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "retroachievements.api_user" => self.retroachievements.api_user = Some(value.into()),
            "retroachievements.api_key" => self.retroachievements.api_key = Some(value.into()),
            "retroachievements.base_url" => self.retroachievements.base_url = Some(value.into()),
            "catalog.cache_dir" => self.catalog.cache_dir = PathBuf::from(value),
            "catalog.flashpoint_cache_dir" => {
                self.catalog.flashpoint_cache_dir = PathBuf::from(value)
            }
            "catalog.flashpoint_api_url" => self.catalog.flashpoint_api_url = Some(value.into()),
            "catalog.refill_attempts" => self.catalog.refill_attempts = parse_number(key, value)?,
            "catalog.rate_limit_delay_ms" => {
                self.catalog.rate_limit_delay_ms = parse_number(key, value)?
            }
            "catalog.retry_delay_ms" => self.catalog.retry_delay_ms = parse_number(key, value)?,
            "discord.app_id" => self.discord.app_id = Some(value.into()),
            "discord.public_key" => self.discord.public_key = Some(value.into()),
            "server.bind" => self.server.bind = value.into(),
            "server.base_path" => self.server.base_path = value.trim_end_matches('/').into(),
            _ => {
                return Err(TroopaError::InvalidArgument(format!(
                    "Unknown config key: {}. Valid keys: {}",
                    key,
                    SETTABLE_KEYS.join(", ")
                )));
            }
        }
        Ok(())
    }
}

fn read_data_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        TroopaError::Config(format!("cannot read {}: {}", path.display(), e))
    })
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| TroopaError::InvalidArgument(format!("{key} must be a non-negative integer")))
}

/// Mask all but the edges of a secret for display
pub fn mask_secret(secret: &str) -> String {
    if secret.len() > 8 && secret.is_ascii() {
        format!("{}...{}", &secret[..4], &secret[secret.len() - 4..])
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_paths(temp_dir: &TempDir) -> Paths {
        let root = temp_dir.path().to_path_buf();
        Paths {
            config_file: root.join("config.toml"),
            root,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Default Value Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.retroachievements.api_user.is_none());
        assert_eq!(config.catalog.cache_dir, PathBuf::from("db"));
        assert_eq!(config.catalog.refill_attempts, 10);
        assert_eq!(config.catalog.system_id_limit, 100);
        assert_eq!(config.server.base_path, "/trophytroopa");
        assert!(config.flashpoint.is_empty());
    }

    #[test]
    fn test_library_settings_from_config() {
        let mut config = Config::default();
        config.catalog.rate_limit_delay_ms = 250;

        let settings = config.library_settings();

        assert_eq!(settings.rate_limit_delay, Duration::from_millis(250));
        assert_eq!(settings.refill_attempts, 10);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Load/Save Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_returns_default_when_no_file() {
        let temp_dir = TempDir::new().unwrap();
        let paths = make_test_paths(&temp_dir);

        let config = Config::load_from(&paths).unwrap();
        assert!(config.retroachievements.api_key.is_none());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let paths = make_test_paths(&temp_dir);

        let mut config = Config::default();
        config.retroachievements.api_user = Some("player".to_string());
        config.retroachievements.api_key = Some("key-123".to_string());
        config.flashpoint.push(FlashpointInstance {
            name: "arcade".to_string(),
            filter: "library=arcade".to_string(),
        });
        config.save_to(&paths).unwrap();

        let loaded = Config::load_from(&paths).unwrap();
        assert_eq!(loaded.require_credentials().unwrap(), ("player", "key-123"));
        assert_eq!(loaded.flashpoint, config.flashpoint);
    }

    #[test]
    fn test_load_partial_config() {
        let temp_dir = TempDir::new().unwrap();
        let paths = make_test_paths(&temp_dir);
        fs::write(
            &paths.config_file,
            r#"
[catalog]
cache_dir = "/var/cache/troopa"

[[flashpoint]]
name = "flash"
filter = "platform=Flash"
"#,
        )
        .unwrap();

        let config = Config::load_from(&paths).unwrap();
        assert_eq!(config.catalog.cache_dir, PathBuf::from("/var/cache/troopa"));
        assert_eq!(config.catalog.refill_attempts, 10);
        assert_eq!(config.flashpoint[0].name, "flash");
        assert_eq!(config.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_load_invalid_toml_fails() {
        let temp_dir = TempDir::new().unwrap();
        let paths = make_test_paths(&temp_dir);
        fs::write(&paths.config_file, "[catalog\n").unwrap();

        let err = Config::load_from(&paths).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_sets_restrictive_permissions() {
        let temp_dir = TempDir::new().unwrap();
        let paths = make_test_paths(&temp_dir);

        let mut config = Config::default();
        config.retroachievements.api_key = Some("secret".to_string());
        config.save_to(&paths).unwrap();

        let mode = fs::metadata(&paths.config_file).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Require / Set Tests
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_require_credentials_when_missing() {
        let mut config = Config::default();
        config.retroachievements.api_user = Some("only-user".to_string());

        let err = config.require_credentials().unwrap_err();
        assert!(err.to_string().contains("credentials not configured"));
    }

    #[test]
    fn test_set_known_keys() {
        let mut config = Config::default();

        config.set("retroachievements.api_key", " abc ").unwrap();
        config.set("catalog.refill_attempts", "25").unwrap();
        config.set("catalog.flashpoint_api_url", "http://localhost:9999").unwrap();
        config.set("server.base_path", "/bot/").unwrap();

        assert_eq!(config.retroachievements.api_key.as_deref(), Some("abc"));
        assert_eq!(config.catalog.refill_attempts, 25);
        assert_eq!(
            config.catalog.flashpoint_api_url.as_deref(),
            Some("http://localhost:9999")
        );
        assert_eq!(config.server.base_path, "/bot");
    }

    #[test]
    fn test_set_rejects_bad_input() {
        let mut config = Config::default();

        assert!(config.set("catalog.refill_attempts", "-1").is_err());
        let err = config.set("nope", "1").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
    }

    #[test]
    fn test_data_files_override_builtins() {
        let temp_dir = TempDir::new().unwrap();
        let mature = temp_dir.path().join("mature.json");
        let aliases = temp_dir.path().join("aliases.json");
        fs::write(&mature, r#"{"games": [1, 2, 3]}"#).unwrap();
        fs::write(&aliases, r#"{"x": "y"}"#).unwrap();

        let mut config = Config::default();
        config.catalog.mature_games_file = Some(mature);
        config.catalog.system_aliases_file = Some(aliases);

        assert_eq!(config.exclusion_rules().unwrap().mature_count(), 3);
        assert_eq!(config.system_aliases().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_data_file_is_config_error() {
        let mut config = Config::default();
        config.catalog.mature_games_file = Some(PathBuf::from("/nonexistent/mature.json"));

        assert!(matches!(config.exclusion_rules(), Err(TroopaError::Config(_))));
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(mask_secret("short"), "****");
    }
}
