use std::fs;
use std::path::PathBuf;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

use crate::error::Result;

/// Manages paths for TrophyTroopa configuration
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root configuration directory (~/.trophytroopa)
    pub root: PathBuf,
    /// Configuration file path (~/.trophytroopa/config.toml)
    pub config_file: PathBuf,
}

impl Paths {
    /// Create a new Paths instance using the user's home directory
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME")?;
        let root = PathBuf::from(home).join(".trophytroopa");

        Ok(Self {
            config_file: root.join("config.toml"),
            root,
        })
    }

    /// Use an explicit config file instead of the one under $HOME
    pub fn for_config_file(config_file: impl Into<PathBuf>) -> Self {
        let config_file = config_file.into();
        let root = config_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        Self { root, config_file }
    }

    /// Resolve the override if given, the default location otherwise
    pub fn resolve(config_file: Option<&std::path::Path>) -> Result<Self> {
        match config_file {
            Some(path) => Ok(Self::for_config_file(path)),
            None => Self::new(),
        }
    }

    /// Ensure the configuration directory exists with proper permissions
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root)?;

        #[cfg(unix)]
        {
            let perms = fs::Permissions::from_mode(0o700);
            fs::set_permissions(&self.root, perms)?;
        }

        Ok(())
    }

    /// Check if the config file exists
    pub fn config_exists(&self) -> bool {
        self.config_file.exists()
    }
}
