mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{
    mask_secret, CatalogConfig, Config, DiscordConfig, FlashpointInstance,
    RetroAchievementsConfig, ServerConfig, SETTABLE_KEYS,
};
