//! Everything a command or request handler needs, built once from config

use std::sync::Arc;

use tracing::debug;

use crate::cache::Transport;
use crate::config::Config;
use crate::error::{Result, TroopaError};
use crate::flashpoint::FlashpointClient;
use crate::retroachievements::{GameLibrary, RetroAchievementsClient};

/// Shared services for the CLI, the web pages and the interaction endpoint
pub struct AppContext {
    pub library: GameLibrary,
    pub flashpoint: Vec<FlashpointClient>,
}

impl AppContext {
    pub fn new(library: GameLibrary, flashpoint: Vec<FlashpointClient>) -> Self {
        Self {
            library,
            flashpoint,
        }
    }

    /// Wire up clients from configuration.
    ///
    /// Missing credentials are tolerated here so an already populated cache
    /// stays usable; commands that must reach the API check them first.
    pub fn from_config(config: &Config, transport: Arc<dyn Transport>) -> Result<Self> {
        let ra = &config.retroachievements;
        if ra.api_user.is_none() || ra.api_key.is_none() {
            debug!("RetroAchievements credentials not set, relying on cache");
        }

        let mut client = RetroAchievementsClient::new(
            transport.clone(),
            ra.api_user.clone().unwrap_or_default(),
            ra.api_key.clone().unwrap_or_default(),
            &config.catalog.cache_dir,
        )
        .with_retry_delay(config.retry_delay());
        if let Some(base_url) = &ra.base_url {
            client = client.with_base_url(base_url);
        }

        let library = GameLibrary::new(
            client,
            config.exclusion_rules()?,
            config.system_aliases()?,
            config.library_settings(),
        );

        let flashpoint = config
            .flashpoint
            .iter()
            .map(|instance| {
                let client = FlashpointClient::new(
                    transport.clone(),
                    &instance.name,
                    &instance.filter,
                    &config.catalog.flashpoint_cache_dir,
                );
                match &config.catalog.flashpoint_api_url {
                    Some(api_url) => client.with_api_url(api_url),
                    None => client,
                }
            })
            .collect();

        Ok(Self::new(library, flashpoint))
    }

    /// Named Flashpoint collection, or the first configured one
    pub fn flashpoint(&mut self, name: Option<&str>) -> Result<&mut FlashpointClient> {
        match name {
            Some(name) => {
                let index = self
                    .flashpoint
                    .iter()
                    .position(|c| c.name().eq_ignore_ascii_case(name))
                    .ok_or_else(|| {
                        let names = self.flashpoint_names();
                        let configured = if names.is_empty() {
                            "none".to_string()
                        } else {
                            names.join(", ")
                        };
                        TroopaError::UnknownCollection(format!("{name} (configured: {configured})"))
                    })?;
                Ok(&mut self.flashpoint[index])
            }
            None => self.flashpoint.first_mut().ok_or_else(|| {
                TroopaError::config_missing("No [[flashpoint]] collections configured.")
            }),
        }
    }

    pub fn flashpoint_names(&self) -> Vec<&str> {
        self.flashpoint.iter().map(|c| c.name()).collect()
    }
}
