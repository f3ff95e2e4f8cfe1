use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::cache::{cached_fetch, Transport};
use crate::error::{Result, TroopaError};

const API_URL: &str = "https://db-api.unstable.life/";
const DB_URL: &str = "https://flashpointproject.github.io/flashpoint-database/search/#";
const ASSET_URL: &str = "https://infinity.unstable.life/";

/// Length of a Flashpoint game UUID
const GAME_ID_LEN: usize = 36;

/// Search result entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashGame {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub platform: String,
}

/// Sharded asset path `<aa>/<bb>/<id>` for a 36-character game id
pub fn game_id_to_path(game_id: &str) -> Result<String> {
    if game_id.len() != GAME_ID_LEN || !game_id.is_ascii() {
        return Err(TroopaError::InvalidGameId(game_id.to_string()));
    }
    Ok(format!("{}/{}/{game_id}", &game_id[..2], &game_id[2..4]))
}

/// Client for one filtered view of the Flashpoint database
///
/// The whole filtered list is fetched once into `<cache_dir>/<name>.json` and
/// never refreshed automatically.
pub struct FlashpointClient {
    transport: Arc<dyn Transport>,
    name: String,
    query_filter: String,
    cache_dir: PathBuf,
    api_url: String,
    games: Option<Vec<FlashGame>>,
}

impl FlashpointClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        name: impl Into<String>,
        query_filter: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            name: name.into(),
            query_filter: query_filter.into(),
            cache_dir: cache_dir.into(),
            api_url: API_URL.to_string(),
            games: None,
        }
    }

    /// Use a different search API root
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        let mut api_url = api_url.into();
        if !api_url.ends_with('/') {
            api_url.push('/');
        }
        self.api_url = api_url;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn cache_file(&self) -> PathBuf {
        self.cache_dir.join(format!("{}.json", self.name))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub(crate) fn search_url(&self) -> String {
        let mut url = format!("{}search?filter=true&fields=id,title,platform", self.api_url);
        let filter = self.query_filter.trim_start_matches('&');
        if !filter.is_empty() {
            url.push('&');
            url.push_str(filter);
        }
        url
    }

    /// The filtered game list, fetched on first use
    pub fn games(&mut self) -> Result<&[FlashGame]> {
        if self.games.is_none() {
            let games: Vec<FlashGame> =
                cached_fetch(self.transport.as_ref(), &self.search_url(), Some(&self.cache_file()))?;
            info!(collection = %self.name, games = games.len(), "flashpoint list loaded");
            self.games = Some(games);
        }
        Ok(self.games.as_deref().unwrap_or_default())
    }

    /// One game picked uniformly at random
    pub fn random_game(&mut self) -> Result<FlashGame> {
        let name = self.name.clone();
        self.games()?
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| {
                TroopaError::InvalidArgument(format!("flashpoint collection '{name}' is empty"))
            })
    }

    /// Database page for a game
    pub fn make_db_url(&self, game_id: &str) -> String {
        format!("{DB_URL}{game_id}")
    }

    pub fn make_logo_url(&self, game_id: &str) -> Result<String> {
        Ok(format!("{ASSET_URL}images/Logos/{}.png", game_id_to_path(game_id)?))
    }

    pub fn make_screenshot_url(&self, game_id: &str) -> Result<String> {
        Ok(format!(
            "{ASSET_URL}images/Screenshots/{}.png",
            game_id_to_path(game_id)?
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fetch::tests::{PanicTransport, StubTransport};
    use crate::cache::HttpTransport;
    use tempfile::TempDir;

    const ID: &str = "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d";

    const GAMES: &str = r#"[
        {"id": "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d", "title": "Alien Hominid", "platform": "Flash"},
        {"id": "1a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d", "title": "Line Rider", "platform": "Flash"}
    ]"#;

    #[test]
    fn test_game_id_to_path_shards() {
        assert_eq!(
            game_id_to_path(ID).unwrap(),
            format!("0a/1b/{ID}")
        );
    }

    #[test]
    fn test_game_id_to_path_rejects_wrong_length() {
        assert!(matches!(
            game_id_to_path("short"),
            Err(TroopaError::InvalidGameId(_))
        ));
        assert!(game_id_to_path(&format!("{ID}0")).is_err());
        assert!(game_id_to_path("").is_err());
    }

    #[test]
    fn test_url_builders() {
        let client = FlashpointClient::new(Arc::new(PanicTransport), "flash", "", "fp");

        assert_eq!(
            client.make_db_url(ID),
            format!("https://flashpointproject.github.io/flashpoint-database/search/#{ID}")
        );
        assert_eq!(
            client.make_logo_url(ID).unwrap(),
            format!("https://infinity.unstable.life/images/Logos/0a/1b/{ID}.png")
        );
        assert_eq!(
            client.make_screenshot_url(ID).unwrap(),
            format!("https://infinity.unstable.life/images/Screenshots/0a/1b/{ID}.png")
        );
        assert!(client.make_logo_url("nope").is_err());
    }

    #[test]
    fn test_search_url_appends_filter() {
        let client = FlashpointClient::new(Arc::new(PanicTransport), "flash", "&platform=Flash", "fp");
        assert_eq!(
            client.search_url(),
            "https://db-api.unstable.life/search?filter=true&fields=id,title,platform&platform=Flash"
        );
    }

    #[test]
    fn test_random_game_from_cache_file() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("flash.json"), GAMES).unwrap();
        let mut client = FlashpointClient::new(Arc::new(PanicTransport), "flash", "", temp_dir.path());

        let game = client.random_game().unwrap();

        assert!(game.title == "Alien Hominid" || game.title == "Line Rider");
        assert_eq!(client.games().unwrap().len(), 2);
    }

    #[test]
    fn test_list_is_fetched_once_and_cached() {
        let temp_dir = TempDir::new().unwrap();
        let transport = Arc::new(StubTransport::new().route("platform=Flash", GAMES));
        let mut client =
            FlashpointClient::new(transport.clone(), "flash", "platform=Flash", temp_dir.path());

        client.random_game().unwrap();
        client.random_game().unwrap();

        assert_eq!(transport.call_count(), 1);
        assert!(temp_dir.path().join("flash.json").exists());
    }

    #[test]
    fn test_empty_collection_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("none.json"), "[]").unwrap();
        let mut client = FlashpointClient::new(Arc::new(PanicTransport), "none", "", temp_dir.path());

        assert!(client.random_game().is_err());
    }

    #[test]
    fn test_search_against_http_server() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("filter".into(), "true".into()),
                mockito::Matcher::UrlEncoded("fields".into(), "id,title,platform".into()),
                mockito::Matcher::UrlEncoded("library".into(), "arcade".into()),
            ]))
            .with_status(200)
            .with_body(GAMES)
            .create();

        let temp_dir = TempDir::new().unwrap();
        let mut client = FlashpointClient::new(
            Arc::new(HttpTransport::new().unwrap()),
            "arcade",
            "library=arcade",
            temp_dir.path(),
        )
        .with_api_url(server.url());

        assert_eq!(client.games().unwrap().len(), 2);
    }
}
