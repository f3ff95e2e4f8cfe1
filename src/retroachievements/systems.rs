//! Resolving user-typed system names

use std::collections::HashMap;

use super::types::System;
use crate::error::Result;

const DEFAULT_SYSTEM_ALIASES: &str = include_str!("../../data/system_aliases.json");

/// Short names mapped to a substring of the full system name, all lowercase
#[derive(Debug, Clone, Default)]
pub struct SystemAliases {
    aliases: HashMap<String, String>,
}

impl SystemAliases {
    pub fn new<I, K, V>(aliases: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self {
            aliases: aliases
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_lowercase(), v.as_ref().to_lowercase()))
                .collect(),
        }
    }

    /// Parse a flat `{"alias": "name fragment"}` object
    pub fn from_json(json: &str) -> Result<Self> {
        let aliases: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self::new(aliases))
    }

    /// Aliases shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json(DEFAULT_SYSTEM_ALIASES)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Lowercased query, replaced by its alias target if it has one
    pub fn resolve(&self, query: &str) -> String {
        let query = query.trim().to_lowercase();
        match self.aliases.get(&query) {
            Some(target) => target.clone(),
            None => query,
        }
    }
}

/// Find the system whose name best matches `query`
///
/// Case-insensitive. Among all names containing the (alias-resolved) query
/// the one closest in length wins, so `"nes"` prefers `NES/Famicom` over
/// `SNES/Super Famicom`. Ties go to the earlier system.
pub fn match_system<'a>(
    systems: &'a [System],
    aliases: &SystemAliases,
    query: &str,
) -> Option<&'a System> {
    let needle = aliases.resolve(query);
    if needle.is_empty() {
        return None;
    }
    let needle_len = needle.chars().count();

    systems
        .iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .min_by_key(|s| s.name.chars().count().abs_diff(needle_len))
}
