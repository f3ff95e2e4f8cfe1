//! Catalog commands: update, stats, systems

use tracing::info;

use crate::cli::args::{OutputFormat, SystemsArgs};
use crate::config::Config;
use crate::context::AppContext;
use crate::error::Result;
use crate::output;

/// Handle the update command
pub fn update(config: &Config, context: &mut AppContext, format: OutputFormat) -> Result<String> {
    // Fail before touching the cache if we cannot authenticate
    config.require_credentials()?;

    info!(
        cache_dir = %config.catalog.cache_dir.display(),
        "rebuilding catalog cache"
    );
    let summary = context.library.update_cache()?;
    output::format_update(&summary, format)
}

/// Handle the stats command
pub fn stats(context: &mut AppContext, format: OutputFormat) -> Result<String> {
    let stats = context.library.stats()?;
    output::format_stats(&stats, format)
}

/// Handle the systems command
pub fn systems(context: &mut AppContext, args: &SystemsArgs, format: OutputFormat) -> Result<String> {
    let library = &mut context.library;

    match &args.query {
        Some(query) => {
            let system = library.match_system(query)?;
            output::format_system_match(query, system.as_ref(), format)
        }
        None => {
            let limit = library.settings().system_id_limit;
            let systems: Vec<_> = library
                .list_systems()?
                .into_iter()
                .filter(|s| s.id < limit)
                .collect();
            output::format_systems(&systems, format)
        }
    }
}
