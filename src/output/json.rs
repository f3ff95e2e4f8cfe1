use serde::Serialize;

use crate::error::Result;
use crate::retroachievements::{System, UpdateSummary};

/// Format systems as JSON, with lowercase keys like the rest of our output
pub fn format_systems(systems: &[System]) -> Result<String> {
    let systems: Vec<_> = systems
        .iter()
        .map(|s| serde_json::json!({"id": s.id, "name": s.name}))
        .collect();
    format_json(&systems)
}

/// Format a system lookup as JSON; `system` is null when nothing matched
pub fn format_system_match(query: &str, system: Option<&System>) -> Result<String> {
    let result = serde_json::json!({
        "query": query,
        "system": system.map(|s| serde_json::json!({"id": s.id, "name": s.name})),
    });
    format_json(&result)
}

/// Format a cache rebuild summary as JSON
pub fn format_update(summary: &UpdateSummary) -> Result<String> {
    let result = serde_json::json!({
        "success": true,
        "systems": summary.systems,
        "games": summary.games,
        "with_achievements": summary.with_achievements,
    });
    format_json(&result)
}

/// Format any serializable value as JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
