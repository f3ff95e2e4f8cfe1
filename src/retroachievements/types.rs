use serde::{Deserialize, Deserializer, Serialize};

/// Some API responses encode numbers as strings; accept both
fn int_or_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(u32),
        Str(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => Ok(v),
        Raw::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// A gaming platform, as returned by `API_GetConsoleIDs.php`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    #[serde(rename = "ID", deserialize_with = "int_or_string")]
    pub id: u32,
    #[serde(rename = "Name")]
    pub name: String,
}

/// Game list entry, as returned by `API_GetGameList.php`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Game {
    #[serde(rename = "ID", deserialize_with = "int_or_string")]
    pub id: u32,
    pub title: String,
    #[serde(rename = "ConsoleID", deserialize_with = "int_or_string")]
    pub console_id: u32,
    #[serde(default)]
    pub console_name: String,
    /// Zero means the game has no achievement set yet
    #[serde(default, deserialize_with = "int_or_string")]
    pub num_achievements: u32,
    /// Site-relative path, e.g. `/Images/000001.png`
    #[serde(default)]
    pub image_icon: String,
}

impl Game {
    pub fn has_achievements(&self) -> bool {
        self.num_achievements > 0
    }
}

/// Extended game information from `API_GetGame.php`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameDetails {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub console_name: Option<String>,
    #[serde(default)]
    pub developer: Option<String>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub released: Option<String>,
    #[serde(default)]
    pub image_icon: Option<String>,
    #[serde(default)]
    pub image_title: Option<String>,
    #[serde(default)]
    pub image_ingame: Option<String>,
    #[serde(default)]
    pub image_box_art: Option<String>,
}

/// Per-system game counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStats {
    pub name: String,
    pub total: usize,
    pub with_achievements: usize,
}

/// Catalog-wide game counts, systems in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub total: usize,
    pub with_achievements: usize,
    pub systems: Vec<SystemStats>,
}
