//! Minimal interaction webhook payloads
//!
//! Only the fields the bot reads or writes are modelled; everything else in
//! the inbound JSON is ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_repr::{Deserialize_repr, Serialize_repr};

/// Interaction kinds the bot reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
}

impl InteractionType {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::Ping),
            2 => Some(Self::ApplicationCommand),
            _ => None,
        }
    }
}

/// Inbound interaction
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    /// Raw type code, kept numeric so unknown kinds can be rejected cleanly
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<CommandData>,
}

impl Interaction {
    pub fn interaction_type(&self) -> Option<InteractionType> {
        InteractionType::from_code(self.kind)
    }
}

/// Slash command invocation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandData {
    pub name: String,
    #[serde(default)]
    pub options: Vec<CommandOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandOption {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

impl CommandData {
    fn option(&self, name: &str) -> Option<&Value> {
        self.options
            .iter()
            .find(|o| o.name == name)
            .map(|o| &o.value)
    }

    /// Integer option; numeric strings are accepted too
    pub fn int_option(&self, name: &str) -> Option<i64> {
        match self.option(name)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn bool_option(&self, name: &str) -> Option<bool> {
        match self.option(name)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn str_option(&self, name: &str) -> Option<&str> {
        self.option(name)?.as_str().filter(|s| !s.trim().is_empty())
    }
}

/// Outbound interaction response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: InteractionCallbackType,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub data: Option<InteractionCallbackData>,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: InteractionCallbackType::Pong,
            data: None,
        }
    }

    /// Plain text reply
    pub fn message(content: impl Into<String>) -> Self {
        Self::with_embeds(content, Vec::new())
    }

    pub fn with_embeds(content: impl Into<String>, embeds: Vec<Embed>) -> Self {
        Self {
            kind: InteractionCallbackType::ChannelMessageWithSource,
            data: Some(InteractionCallbackData {
                content: Some(content.into()),
                embeds,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum InteractionCallbackType {
    Pong = 1,
    ChannelMessageWithSource = 4,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionCallbackData {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub embeds: Vec<Embed>,
}

/// Rich embed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub color: u32,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub thumbnail: Option<EmbedImage>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image: Option<EmbedImage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedImage {
    pub url: String,
}

impl EmbedImage {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ping_parses() {
        let interaction: Interaction = serde_json::from_value(json!({"type": 1, "id": "1"})).unwrap();
        assert_eq!(interaction.interaction_type(), Some(InteractionType::Ping));
        assert!(interaction.data.is_none());
    }

    #[test]
    fn test_unknown_type_is_kept_raw() {
        let interaction: Interaction = serde_json::from_value(json!({"type": 3})).unwrap();
        assert_eq!(interaction.interaction_type(), None);
    }

    #[test]
    fn test_command_options() {
        let interaction: Interaction = serde_json::from_value(json!({
            "type": 2,
            "data": {
                "name": "trophygames",
                "options": [
                    {"name": "count", "type": 4, "value": 3},
                    {"name": "empty", "type": 5, "value": true},
                    {"name": "system", "type": 3, "value": "snes"}
                ]
            }
        }))
        .unwrap();

        let data = interaction.data.unwrap();
        assert_eq!(data.name, "trophygames");
        assert_eq!(data.int_option("count"), Some(3));
        assert_eq!(data.bool_option("empty"), Some(true));
        assert_eq!(data.bool_option("hacks"), None);
        assert_eq!(data.str_option("system"), Some("snes"));
    }

    #[test]
    fn test_pong_serializes_without_data() {
        let json = serde_json::to_value(InteractionResponse::pong()).unwrap();
        assert_eq!(json, json!({"type": 1}));
    }

    #[test]
    fn test_message_serializes() {
        let json = serde_json::to_value(InteractionResponse::message("hi")).unwrap();
        assert_eq!(json, json!({"type": 4, "data": {"content": "hi"}}));
    }
}
