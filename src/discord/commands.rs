//! Interaction webhook handling
//!
//! [`handle_interaction`] turns a verified, parsed interaction into the
//! response body. Problems the user can fix (bad options, unknown system,
//! a pool too small for the request) come back as a normal chat message;
//! only malformed requests and internal failures become errors.

use thiserror::Error;
use tracing::{debug, info};

use super::embed::{embed_color, flash_embed, game_embed};
use super::types::{CommandData, Interaction, InteractionResponse, InteractionType};
use super::verify::SignatureVerifier;
use crate::context::AppContext;
use crate::error::TroopaError;
use crate::retroachievements::SampleRequest;

/// Most games a single `trophygames` call may pull
pub const MAX_GAMES_PER_COMMAND: i64 = 10;

/// Why an interaction request was rejected
#[derive(Error, Debug)]
pub enum InteractionError {
    /// Missing or invalid request signature
    #[error("invalid request signature")]
    Unauthorized,

    /// Malformed payload, unknown command or interaction type
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Catalog or network failure while building the reply
    #[error(transparent)]
    Internal(#[from] TroopaError),
}

impl InteractionError {
    /// HTTP status for the web layer
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::BadRequest(_) => 400,
            Self::Internal(_) => 500,
        }
    }
}

/// Check the signature headers of an inbound request
pub fn verify_request(
    verifier: &SignatureVerifier,
    body: &[u8],
    signature: Option<&str>,
    timestamp: Option<&str>,
) -> Result<(), InteractionError> {
    match (signature, timestamp) {
        (Some(signature), Some(timestamp)) if verifier.verify(body, signature, timestamp) => Ok(()),
        _ => Err(InteractionError::Unauthorized),
    }
}

/// Parse the JSON body of an interaction request
pub fn parse_interaction(body: &[u8]) -> Result<Interaction, InteractionError> {
    serde_json::from_slice(body)
        .map_err(|e| InteractionError::BadRequest(format!("invalid interaction payload: {e}")))
}

/// Build the response for an interaction
pub fn handle_interaction(
    context: &mut AppContext,
    interaction: &Interaction,
) -> Result<InteractionResponse, InteractionError> {
    match interaction.interaction_type() {
        Some(InteractionType::Ping) => Ok(InteractionResponse::pong()),
        Some(InteractionType::ApplicationCommand) => {
            let command = interaction
                .data
                .as_ref()
                .ok_or_else(|| InteractionError::BadRequest("missing command data".into()))?;
            info!(command = %command.name, "interaction command");

            match command.name.as_str() {
                "trophygames" => trophygames(context, command),
                "flashgame" => flashgame(context, command),
                other => Err(InteractionError::BadRequest(format!("unknown command: {other}"))),
            }
        }
        None => Err(InteractionError::BadRequest(format!(
            "invalid interaction type: {}",
            interaction.kind
        ))),
    }
}

/// Errors worth showing to the person who ran the command
fn user_facing(error: TroopaError) -> Result<InteractionResponse, InteractionError> {
    match error {
        TroopaError::Sample(_)
        | TroopaError::UnknownSystem(_)
        | TroopaError::UnknownCollection(_)
        | TroopaError::ConfigMissing(_) => {
            debug!(error = %error, "replying with error message");
            Ok(InteractionResponse::message(error.to_string()))
        }
        other => Err(InteractionError::Internal(other)),
    }
}

fn trophygames(
    context: &mut AppContext,
    command: &CommandData,
) -> Result<InteractionResponse, InteractionError> {
    let count = command.int_option("count").unwrap_or(1);
    if !(1..=MAX_GAMES_PER_COMMAND).contains(&count) {
        return Ok(InteractionResponse::message(format!(
            "count must be between 1 and {MAX_GAMES_PER_COMMAND}"
        )));
    }
    let allow_empty = command.bool_option("empty").unwrap_or(false);
    let allow_hacks = command.bool_option("hacks").unwrap_or(true);

    let library = &mut context.library;
    let systems = match command.str_option("system") {
        Some(name) => match library.resolve_systems(&[name]) {
            Ok(ids) => ids,
            Err(e) => return user_facing(e),
        },
        None => None,
    };

    let mut request = SampleRequest::new(count as usize)
        .allow_empty(allow_empty)
        .allow_hacks(allow_hacks);
    if let Some(ids) = systems {
        request = request.systems(ids);
    }
    let games = match library.random_games(&request) {
        Ok(games) => games,
        Err(e) => return user_facing(e),
    };

    let embeds = games
        .iter()
        .enumerate()
        .map(|(i, game)| {
            let details = library.game_details(game.id);
            game_embed(library.client(), game, details.as_ref(), embed_color(i))
        })
        .collect();

    let plural = if games.len() == 1 { "" } else { "s" };
    Ok(InteractionResponse::with_embeds(
        format!(
            "Pulled {} random game{plural} (empty: {allow_empty}, hacks: {allow_hacks})",
            games.len()
        ),
        embeds,
    ))
}

fn flashgame(
    context: &mut AppContext,
    command: &CommandData,
) -> Result<InteractionResponse, InteractionError> {
    let client = match context.flashpoint(command.str_option("collection")) {
        Ok(client) => client,
        Err(e) => return user_facing(e),
    };

    let game = client.random_game()?;
    let embed = flash_embed(client, &game, embed_color(0))?;

    Ok(InteractionResponse::with_embeds(
        format!("Pulled a random game from {}", client.name()),
        vec![embed],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::fetch::tests::{PanicTransport, StubTransport};
    use crate::discord::types::InteractionCallbackType;
    use crate::discord::verify::tests::{public_hex, sign};
    use crate::flashpoint::FlashpointClient;
    use crate::retroachievements::library_fixture::{library, write_fixture};
    use serde_json::json;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn context(dir: &TempDir) -> AppContext {
        let db = dir.path().join("db");
        write_fixture(&db);
        // Detail lookups hit the stub and fail, so embeds carry list data only
        AppContext::new(library(StubTransport::new(), &db), Vec::new())
    }

    fn command(payload: serde_json::Value) -> Interaction {
        serde_json::from_value(json!({"type": 2, "data": payload})).unwrap()
    }

    fn content(response: &InteractionResponse) -> &str {
        response
            .data
            .as_ref()
            .and_then(|d| d.content.as_deref())
            .unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Request validation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_verify_request() {
        let verifier = SignatureVerifier::from_hex(&public_hex()).unwrap();
        let body = br#"{"type":1}"#;
        let signature = sign(body, "42");

        assert!(verify_request(&verifier, body, Some(&signature), Some("42")).is_ok());
        assert!(matches!(
            verify_request(&verifier, body, Some(&signature), Some("43")),
            Err(InteractionError::Unauthorized)
        ));
        assert!(matches!(
            verify_request(&verifier, body, None, Some("42")),
            Err(InteractionError::Unauthorized)
        ));
    }

    #[test]
    fn test_parse_interaction_rejects_garbage() {
        let err = parse_interaction(b"not json").unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_ping_gets_pong() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);
        let ping = parse_interaction(br#"{"type":1}"#).unwrap();

        let response = handle_interaction(&mut context, &ping).unwrap();

        assert_eq!(response, InteractionResponse::pong());
    }

    #[test]
    fn test_unknown_type_and_command_are_bad_requests() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let unknown_type = parse_interaction(br#"{"type":3}"#).unwrap();
        let unknown_command = command(json!({"name": "dance"}));
        let missing_data = parse_interaction(br#"{"type":2}"#).unwrap();

        for interaction in [unknown_type, unknown_command, missing_data] {
            let err = handle_interaction(&mut context, &interaction).unwrap_err();
            assert!(matches!(err, InteractionError::BadRequest(_)));
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // trophygames
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_trophygames_defaults_to_one_game() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let response =
            handle_interaction(&mut context, &command(json!({"name": "trophygames"}))).unwrap();

        assert_eq!(response.kind, InteractionCallbackType::ChannelMessageWithSource);
        assert_eq!(
            content(&response),
            "Pulled 1 random game (empty: false, hacks: true)"
        );
        let embeds = &response.data.as_ref().unwrap().embeds;
        assert_eq!(embeds.len(), 1);
        assert_eq!(embeds[0].color, 0x1066dd);
        assert!(["Sonic", "Mario", "Zelda"].contains(&embeds[0].title.as_str()));
    }

    #[test]
    fn test_trophygames_multiple_games_alternate_colors() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let response = handle_interaction(
            &mut context,
            &command(json!({"name": "trophygames", "options": [
                {"name": "count", "value": 3},
                {"name": "hacks", "value": false}
            ]})),
        )
        .unwrap();

        assert_eq!(
            content(&response),
            "Pulled 3 random games (empty: false, hacks: false)"
        );
        let colors: Vec<u32> = response
            .data
            .unwrap()
            .embeds
            .iter()
            .map(|e| e.color)
            .collect();
        assert_eq!(colors, vec![0x1066dd, 0xcc9a00, 0x1066dd]);
    }

    #[test]
    fn test_trophygames_pool_too_small_is_a_message() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let response = handle_interaction(
            &mut context,
            &command(json!({"name": "trophygames", "options": [{"name": "count", "value": 5}]})),
        )
        .unwrap();

        assert_eq!(response.kind, InteractionCallbackType::ChannelMessageWithSource);
        assert!(response.data.unwrap().embeds.is_empty());
    }

    #[test]
    fn test_trophygames_count_out_of_range() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let response = handle_interaction(
            &mut context,
            &command(json!({"name": "trophygames", "options": [{"name": "count", "value": 11}]})),
        )
        .unwrap();

        assert_eq!(content(&response), "count must be between 1 and 10");
    }

    #[test]
    fn test_trophygames_system_option() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let response = handle_interaction(
            &mut context,
            &command(json!({"name": "trophygames", "options": [
                {"name": "system", "value": "genesis"}
            ]})),
        )
        .unwrap();
        assert_eq!(response.data.unwrap().embeds[0].title, "Sonic");

        let response = handle_interaction(
            &mut context,
            &command(json!({"name": "trophygames", "options": [
                {"name": "system", "value": "dreamcast"}
            ]})),
        )
        .unwrap();
        assert_eq!(content(&response), "No system matches 'dreamcast'");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // flashgame
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_flashgame_from_cached_collection() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("flash.json"),
            r#"[{"id": "0a1b2c3d-4e5f-6a7b-8c9d-0e1f2a3b4c5d", "title": "Line Rider", "platform": "Flash"}]"#,
        )
        .unwrap();
        let mut context = context(&dir);
        context.flashpoint.push(FlashpointClient::new(
            Arc::new(PanicTransport),
            "flash",
            "",
            dir.path(),
        ));

        let response =
            handle_interaction(&mut context, &command(json!({"name": "flashgame"}))).unwrap();

        assert_eq!(content(&response), "Pulled a random game from flash");
        assert_eq!(response.data.unwrap().embeds[0].title, "Line Rider");
    }

    #[test]
    fn test_flashgame_unknown_collection_is_a_message() {
        let dir = TempDir::new().unwrap();
        let mut context = context(&dir);

        let response = handle_interaction(
            &mut context,
            &command(json!({"name": "flashgame", "options": [{"name": "collection", "value": "java"}]})),
        )
        .unwrap();

        assert_eq!(
            content(&response),
            "Unknown flashpoint collection: java (configured: none)"
        );
    }
}
