mod client;

pub use client::{game_id_to_path, FlashGame, FlashpointClient};
