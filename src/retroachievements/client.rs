use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::types::*;
use crate::cache::{cached_fetch, Transport, GAMELIST_DIR, SYSTEMS_FILE};
use crate::error::Result;

/// Public site root; API endpoints live under `API/`
pub const DEFAULT_BASE_URL: &str = "https://retroachievements.org/";

/// RetroAchievements API client
///
/// List endpoints are cached as JSON files under `cache_dir`; game details
/// are always fetched live.
#[derive(Clone)]
pub struct RetroAchievementsClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    auth_user: String,
    auth_key: String,
    cache_dir: PathBuf,
    retry_delay: Duration,
}

impl RetroAchievementsClient {
    /// Create a new client
    pub fn new(
        transport: Arc<dyn Transport>,
        auth_user: impl Into<String>,
        auth_key: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            transport,
            base_url: DEFAULT_BASE_URL.to_string(),
            auth_user: auth_user.into(),
            auth_key: auth_key.into(),
            cache_dir: cache_dir.into(),
            retry_delay: Duration::from_secs(1),
        }
    }

    /// Point the client at a different site root (tests, mirrors)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Pause before the single retry of a failed detail lookup
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Same credentials and transport, different cache directory
    pub fn with_cache_dir(&self, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            ..self.clone()
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Path of the cached system list; its mtime versions the whole cache
    pub fn systems_file(&self) -> PathBuf {
        self.cache_dir.join(SYSTEMS_FILE)
    }

    fn api_url(&self, endpoint: &str, args: &[(&str, String)]) -> String {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("z", &self.auth_user)
            .append_pair("y", &self.auth_key)
            .extend_pairs(args)
            .finish();

        format!("{}API/{endpoint}?{query}", self.base_url)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cached Lists
    // ─────────────────────────────────────────────────────────────────────────

    /// List all known systems, including non-game groupings like hubs
    pub fn list_systems(&self) -> Result<Vec<System>> {
        let url = self.api_url("API_GetConsoleIDs.php", &[]);
        cached_fetch(self.transport.as_ref(), &url, Some(&self.systems_file()))
    }

    /// List every game of a system, including games without achievements
    pub fn list_games(&self, system_id: u32) -> Result<Vec<Game>> {
        let url = self.api_url("API_GetGameList.php", &[("i", system_id.to_string())]);
        let cache_path = self
            .cache_dir
            .join(GAMELIST_DIR)
            .join(format!("{system_id}.json"));
        cached_fetch(self.transport.as_ref(), &url, Some(&cache_path))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Game Details
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch details for a game, retrying once after a short pause
    ///
    /// The API throttles aggressively, so a first failure is assumed to be
    /// transient.
    pub fn game_details(&self, game_id: u32) -> Result<GameDetails> {
        let url = self.api_url("API_GetGame.php", &[("i", game_id.to_string())]);

        match cached_fetch(self.transport.as_ref(), &url, None) {
            Ok(details) => Ok(details),
            Err(e) => {
                warn!(game_id, error = %e, "game details lookup failed, retrying");
                std::thread::sleep(self.retry_delay);
                cached_fetch(self.transport.as_ref(), &url, None)
            }
        }
    }

    /// Details if they can be had, `None` otherwise
    pub fn try_game_details(&self, game_id: u32) -> Option<GameDetails> {
        match self.game_details(game_id) {
            Ok(details) => Some(details),
            Err(e) => {
                debug!(game_id, error = %e, "continuing without game details");
                None
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // URLs
    // ─────────────────────────────────────────────────────────────────────────

    /// Absolute URL for a site-relative path returned by the API
    pub fn make_full_url(&self, relative_url: &str) -> String {
        let relative_url = relative_url.strip_prefix('/').unwrap_or(relative_url);
        format!("{}{relative_url}", self.base_url)
    }

    /// Public game page
    pub fn make_game_url(&self, game_id: u32) -> String {
        self.make_full_url(&format!("game/{game_id}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fetch::tests::{PanicTransport, StubTransport};
    use crate::cache::HttpTransport;
    use crate::error::TroopaError;
    use tempfile::TempDir;

    fn client_with(transport: impl Transport + 'static, dir: &Path) -> RetroAchievementsClient {
        RetroAchievementsClient::new(Arc::new(transport), "user", "secret", dir)
            .with_retry_delay(Duration::ZERO)
    }

    #[test]
    fn test_api_url_carries_credentials_and_args() {
        let temp_dir = TempDir::new().unwrap();
        let client = client_with(PanicTransport, temp_dir.path());

        let url = client.api_url("API_GetGameList.php", &[("i", "5".to_string())]);

        assert_eq!(
            url,
            "https://retroachievements.org/API/API_GetGameList.php?z=user&y=secret&i=5"
        );
    }

    #[test]
    fn test_credentials_are_url_encoded() {
        let temp_dir = TempDir::new().unwrap();
        let client = RetroAchievementsClient::new(
            Arc::new(PanicTransport),
            "a user",
            "k&y",
            temp_dir.path(),
        );

        let url = client.api_url("API_GetConsoleIDs.php", &[]);

        assert!(url.ends_with("?z=a+user&y=k%26y"));
    }

    #[test]
    fn test_list_games_uses_per_system_cache_file() {
        let temp_dir = TempDir::new().unwrap();
        let transport = StubTransport::new()
            .route("i=7", r#"[{"ID": 1, "Title": "A", "ConsoleID": 7, "NumAchievements": 3}]"#);
        let client = client_with(transport, temp_dir.path());

        let games = client.list_games(7).unwrap();

        assert_eq!(games.len(), 1);
        assert!(temp_dir.path().join("gamelist").join("7.json").exists());
    }

    #[test]
    fn test_cached_lists_need_no_network() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(
            temp_dir.path().join("systems.json"),
            r#"[{"ID": 1, "Name": "Genesis/Mega Drive"}]"#,
        )
        .unwrap();
        let client = client_with(PanicTransport, temp_dir.path());

        let systems = client.list_systems().unwrap();

        assert_eq!(systems[0].name, "Genesis/Mega Drive");
    }

    #[test]
    fn test_game_details_against_http_server() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/API/API_GetGame.php")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("z".into(), "user".into()),
                mockito::Matcher::UrlEncoded("y".into(), "secret".into()),
                mockito::Matcher::UrlEncoded("i".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"Title": "Zelda", "Developer": "Nintendo", "Genre": "Adventure"}"#)
            .create();

        let temp_dir = TempDir::new().unwrap();
        let client = client_with(HttpTransport::new().unwrap(), temp_dir.path())
            .with_base_url(server.url());

        let details = client.game_details(10).unwrap();

        assert_eq!(details.developer.as_deref(), Some("Nintendo"));
    }

    #[test]
    fn test_game_details_retries_once() {
        let mut server = mockito::Server::new();
        let failing = server
            .mock("GET", "/API/API_GetGame.php")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .expect(2)
            .create();

        let temp_dir = TempDir::new().unwrap();
        let client = client_with(HttpTransport::new().unwrap(), temp_dir.path())
            .with_base_url(server.url());

        let err = client.game_details(10).unwrap_err();

        assert!(matches!(err, TroopaError::Api { status: 429, .. }));
        failing.assert();
        assert!(client.try_game_details(10).is_none());
    }

    #[test]
    fn test_http_error_status_propagates() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/API/API_GetConsoleIDs.php")
            .match_query(mockito::Matcher::Any)
            .with_status(401)
            .with_body("Unauthorized")
            .create();

        let temp_dir = TempDir::new().unwrap();
        let client = client_with(HttpTransport::new().unwrap(), temp_dir.path())
            .with_base_url(server.url());

        let err = client.list_systems().unwrap_err();

        assert!(matches!(err, TroopaError::Api { status: 401, .. }));
        assert!(!client.systems_file().exists());
    }

    #[test]
    fn test_make_full_url_strips_leading_slash() {
        let temp_dir = TempDir::new().unwrap();
        let client = client_with(PanicTransport, temp_dir.path());

        assert_eq!(
            client.make_full_url("/Images/000001.png"),
            "https://retroachievements.org/Images/000001.png"
        );
        assert_eq!(
            client.make_full_url("Images/000001.png"),
            "https://retroachievements.org/Images/000001.png"
        );
        assert_eq!(client.make_game_url(42), "https://retroachievements.org/game/42");
    }

    #[test]
    fn test_with_cache_dir_keeps_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let client = client_with(PanicTransport, temp_dir.path());

        let other = client.with_cache_dir(temp_dir.path().join("db.update"));

        assert!(other.cache_dir().ends_with("db.update"));
        assert!(other.api_url("X.php", &[]).contains("z=user&y=secret"));
    }
}
