//! Discord interaction webhook: payloads, signature check, command handling

mod commands;
mod embed;
pub mod types;
pub(crate) mod verify;

pub use commands::{
    handle_interaction, parse_interaction, verify_request, InteractionError,
    MAX_GAMES_PER_COMMAND,
};
pub use embed::{embed_color, flash_embed, game_embed, EMBED_COLORS};
pub use types::{Interaction, InteractionResponse};
pub use verify::{SignatureVerifier, SIGNATURE_HEADER, TIMESTAMP_HEADER};
