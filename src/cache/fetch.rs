//! Fetch-with-optional-file-cache primitive shared by every API client

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Result, TroopaError};

const USER_AGENT: &str = concat!("TrophyTroopa/", env!("CARGO_PKG_VERSION"));

/// Raw GET access to a remote service.
///
/// The catalog clients only ever need the response body; everything else
/// (caching, parsing) is layered on top in [`cached_fetch`].
pub trait Transport: Send + Sync {
    /// Fetch `url` and return the body of a successful response
    fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking reqwest transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default user agent and timeout
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(TroopaError::api(status.as_u16(), message));
        }

        Ok(response.bytes()?.to_vec())
    }
}

/// Fetch JSON from `url`, going through a cache file when one is given.
///
/// An existing cache file is always trusted and no request is made. Otherwise
/// the raw body is written to `cache_path` (parents created) before parsing,
/// so a file that fails to parse still shows what the server sent.
pub fn cached_fetch<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
    cache_path: Option<&Path>,
) -> Result<T> {
    if let Some(path) = cache_path {
        if path.exists() {
            debug!(path = %path.display(), "reading cached response");
            let body = std::fs::read(path)?;
            return Ok(serde_json::from_slice(&body)?);
        }
    }

    debug!(url = %redact_query(url), "fetching");
    let body = transport.get(url)?;

    if let Some(path) = cache_path {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &body)?;
    }

    Ok(serde_json::from_slice(&body)?)
}

/// Like [`cached_fetch`], but an HTTP error status yields `Ok(None)`.
///
/// Transport and parse failures still propagate.
pub fn try_cached_fetch<T: DeserializeOwned>(
    transport: &dyn Transport,
    url: &str,
    cache_path: Option<&Path>,
) -> Result<Option<T>> {
    match cached_fetch(transport, url, cache_path) {
        Ok(value) => Ok(Some(value)),
        Err(TroopaError::Api { status, .. }) => {
            debug!(status, "ignoring HTTP error");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Strip the query string so credentials never reach the logs
fn redact_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Transport that fails the test if it is ever used
    pub struct PanicTransport;

    impl Transport for PanicTransport {
        fn get(&self, url: &str) -> Result<Vec<u8>> {
            panic!("unexpected network access: {url}");
        }
    }

    /// Transport serving canned bodies keyed by URL substring
    #[derive(Default)]
    pub struct StubTransport {
        routes: Vec<(String, std::result::Result<String, u16>)>,
        pub calls: Mutex<Vec<String>>,
    }

    impl StubTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn route(mut self, needle: &str, body: &str) -> Self {
            self.routes.push((needle.to_string(), Ok(body.to_string())));
            self
        }

        pub fn fail(mut self, needle: &str, status: u16) -> Self {
            self.routes.push((needle.to_string(), Err(status)));
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Transport for StubTransport {
        fn get(&self, url: &str) -> Result<Vec<u8>> {
            self.calls.lock().unwrap().push(url.to_string());
            for (needle, outcome) in &self.routes {
                // Needle must end at a URL delimiter so `i=1` never matches `i=100`
                let matched = url.match_indices(needle.as_str()).any(|(i, m)| {
                    matches!(url[i + m.len()..].chars().next(), None | Some('&' | '?'))
                });
                if matched {
                    return match outcome {
                        Ok(body) => Ok(body.clone().into_bytes()),
                        Err(status) => Err(TroopaError::api(*status, "stubbed failure")),
                    };
                }
            }
            Err(TroopaError::api(404, format!("no stub for {url}")))
        }
    }

    #[test]
    fn test_existing_cache_file_skips_network() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("systems.json");
        std::fs::write(&path, r#"[{"ID": 1, "Name": "Genesis"}]"#).unwrap();

        let value: serde_json::Value = cached_fetch(&PanicTransport, "http://x", Some(&path)).unwrap();

        assert_eq!(value[0]["Name"], "Genesis");
    }

    #[test]
    fn test_missing_cache_file_is_fetched_and_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("list.json");
        let transport = StubTransport::new().route("list", r#"{"ok": true}"#);

        let value: serde_json::Value =
            cached_fetch(&transport, "http://host/list", Some(&path)).unwrap();

        assert_eq!(value["ok"], true);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"ok": true}"#);

        // Second call is served from disk
        let _: serde_json::Value = cached_fetch(&transport, "http://host/list", Some(&path)).unwrap();
        assert_eq!(transport.call_count(), 1);
    }

    #[test]
    fn test_no_cache_path_always_fetches() {
        let transport = StubTransport::new().route("details", "[1, 2]");

        let _: Vec<u32> = cached_fetch(&transport, "http://host/details", None).unwrap();
        let v: Vec<u32> = cached_fetch(&transport, "http://host/details", None).unwrap();

        assert_eq!(v, vec![1, 2]);
        assert_eq!(transport.call_count(), 2);
    }

    #[test]
    fn test_http_error_propagates_and_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("list.json");
        let transport = StubTransport::new().fail("list", 429);

        let err = cached_fetch::<serde_json::Value>(&transport, "http://host/list", Some(&path))
            .unwrap_err();

        assert!(matches!(err, TroopaError::Api { status: 429, .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_try_cached_fetch_suppresses_http_error() {
        let transport = StubTransport::new().fail("list", 500);

        let value: Option<serde_json::Value> =
            try_cached_fetch(&transport, "http://host/list", None).unwrap();

        assert!(value.is_none());
    }

    #[test]
    fn test_try_cached_fetch_still_reports_bad_json() {
        let transport = StubTransport::new().route("list", "not json");

        let result = try_cached_fetch::<serde_json::Value>(&transport, "http://host/list", None);

        assert!(matches!(result, Err(TroopaError::Json(_))));
    }

    #[test]
    fn test_redact_query_strips_credentials() {
        assert_eq!(redact_query("http://a/b.php?z=user&y=key"), "http://a/b.php");
        assert_eq!(redact_query("http://a/b"), "http://a/b");
    }
}
