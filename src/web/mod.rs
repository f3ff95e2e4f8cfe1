//! Web frontend and interaction endpoint
//!
//! The catalog code is blocking, so every handler hands its work to
//! `spawn_blocking` and locks the shared [`AppContext`] there.

mod handlers;

use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::context::AppContext;
use crate::discord::SignatureVerifier;
use crate::error::{Result, TroopaError};

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    context: Arc<Mutex<AppContext>>,
    verifier: Option<Arc<SignatureVerifier>>,
    base_path: String,
}

impl AppState {
    pub fn new(
        context: AppContext,
        verifier: Option<SignatureVerifier>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            context: Arc::new(Mutex::new(context)),
            verifier: verifier.map(Arc::new),
            base_path: normalize_base_path(&base_path.into()),
        }
    }
}

/// `""` or `/segment...` without a trailing slash
fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}

/// All routes, mounted below the configured base path
pub fn router(state: AppState) -> Router {
    let base = state.base_path.clone();

    let mut router = Router::new()
        .route(&format!("{base}/"), get(handlers::index))
        .route(&format!("{base}/random"), get(handlers::random))
        .route(&format!("{base}/any"), get(handlers::any))
        .route(&format!("{base}/stats"), get(handlers::stats))
        .route(&format!("{base}/flash/{{instance}}"), get(handlers::flash))
        .route(&format!("{base}/tos"), get(handlers::tos))
        .route(&format!("{base}/privacy"), get(handlers::privacy))
        .route(
            &format!("{base}/discord_interaction"),
            post(handlers::discord_interaction),
        );

    // Pages use relative links, so the index needs its trailing slash
    if !base.is_empty() {
        router = router
            .route("/", get(handlers::redirect_to_index))
            .route(&base, get(handlers::redirect_to_index));
    }

    router
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the web server until it fails
pub fn serve(config: &Config, context: AppContext) -> Result<()> {
    let verifier = match config.discord.public_key.as_deref() {
        Some(key) => Some(SignatureVerifier::from_hex(key)?),
        None => {
            warn!("discord.public_key not set, interaction requests will be rejected");
            None
        }
    };
    let state = AppState::new(context, verifier, &config.server.base_path);
    let bind = config.server.bind.clone();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(&bind).await?;
        info!(bind = %bind, base_path = %state.base_path, "trophytroopa listening");
        axum::serve(listener, router(state)).await?;
        Ok::<(), TroopaError>(())
    })
}
