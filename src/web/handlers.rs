use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;
use tracing::warn;

use super::AppState;
use crate::context::AppContext;
use crate::discord::{
    handle_interaction, parse_interaction, verify_request, InteractionError,
    InteractionResponse, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use crate::error::TroopaError;
use crate::output::{html, FlashEntry, GameEntry};
use crate::retroachievements::SampleRequest;

/// A failed request, rendered as a small HTML page
#[derive(Debug)]
pub struct WebError {
    status: StatusCode,
    message: String,
}

impl WebError {
    fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<TroopaError> for WebError {
    fn from(error: TroopaError) -> Self {
        let status = match &error {
            TroopaError::UnknownSystem(_) | TroopaError::UnknownCollection(_) => {
                StatusCode::NOT_FOUND
            }
            TroopaError::Sample(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: error.to_string(),
        }
    }
}

impl From<InteractionError> for WebError {
    fn from(error: InteractionError) -> Self {
        Self {
            status: StatusCode::from_u16(error.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: error.to_string(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, message = %self.message, "request failed");
        }
        (self.status, Html(html::error_page(&self.message))).into_response()
    }
}

/// Run blocking catalog work with exclusive access to the context
async fn with_context<T, F>(state: &AppState, work: F) -> Result<T, WebError>
where
    T: Send + 'static,
    F: FnOnce(&mut AppContext) -> Result<T, WebError> + Send + 'static,
{
    let context = state.context.clone();
    tokio::task::spawn_blocking(move || {
        let mut context = context
            .lock()
            .map_err(|_| WebError::internal("application state is unavailable"))?;
        work(&mut context)
    })
    .await
    .map_err(|e| WebError::internal(format!("request worker failed: {e}")))?
}

#[derive(Debug, Default, Deserialize)]
pub struct PickQuery {
    system: Option<String>,
}

pub async fn redirect_to_index(State(state): State<AppState>) -> Redirect {
    Redirect::to(&format!("{}/", state.base_path))
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    with_context(&state, |context| {
        let catalog = context.library.catalog()?;
        Ok(Html(html::index_page(
            catalog.len(),
            catalog.with_achievements_len(),
        )))
    })
    .await
}

pub async fn random(
    State(state): State<AppState>,
    Query(query): Query<PickQuery>,
) -> Result<Html<String>, WebError> {
    pick_game(state, false, query.system).await
}

pub async fn any(
    State(state): State<AppState>,
    Query(query): Query<PickQuery>,
) -> Result<Html<String>, WebError> {
    pick_game(state, true, query.system).await
}

async fn pick_game(
    state: AppState,
    allow_empty: bool,
    system: Option<String>,
) -> Result<Html<String>, WebError> {
    with_context(&state, move |context| {
        let library = &mut context.library;
        let mut request = SampleRequest::new(1).allow_empty(allow_empty);
        if let Some(ids) = library.resolve_systems(system.as_slice())? {
            request = request.systems(ids);
        }

        let games = library.random_games(&request)?;
        let game = games
            .first()
            .ok_or_else(|| WebError::internal("no game drawn"))?;
        let details = library.game_details(game.id);
        let screenshot = details
            .as_ref()
            .and_then(|d| d.image_ingame.as_deref())
            .filter(|path| !path.is_empty())
            .map(|path| library.client().make_full_url(path));

        let entry = GameEntry::new(library.client(), game);
        Ok(Html(html::game_page(
            &entry,
            details.as_ref(),
            screenshot.as_deref(),
        )))
    })
    .await
}

pub async fn stats(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    with_context(&state, |context| {
        Ok(Html(html::stats_page(&context.library.stats()?)))
    })
    .await
}

pub async fn flash(
    State(state): State<AppState>,
    Path(instance): Path<String>,
) -> Result<Html<String>, WebError> {
    with_context(&state, move |context| {
        let client = context.flashpoint(Some(&instance))?;
        let game = client.random_game()?;
        let entry = FlashEntry::new(client, &game)?;
        Ok(Html(html::flash_page(&entry)))
    })
    .await
}

pub async fn tos() -> Html<String> {
    Html(html::tos_page())
}

pub async fn privacy() -> Html<String> {
    Html(html::privacy_page())
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Signature-checked Discord interaction webhook
pub async fn discord_interaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<InteractionResponse>, WebError> {
    let verifier = state
        .verifier
        .as_deref()
        .ok_or(InteractionError::Unauthorized)?;
    verify_request(
        verifier,
        &body,
        header(&headers, SIGNATURE_HEADER),
        header(&headers, TIMESTAMP_HEADER),
    )?;
    let interaction = parse_interaction(&body)?;

    let response = with_context(&state, move |context| {
        Ok(handle_interaction(context, &interaction)?)
    })
    .await?;
    Ok(Json(response))
}
