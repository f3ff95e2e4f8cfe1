use crate::cli::args::{AnyArgs, OutputFormat, PickArgs, RandomArgs};
use crate::context::AppContext;
use crate::error::{Result, TroopaError};
use crate::output::{self, GameEntry};
use crate::retroachievements::SampleRequest;

/// Handle the random command
pub fn random(context: &mut AppContext, args: &RandomArgs, format: OutputFormat) -> Result<String> {
    pick(context, &args.pick, args.empty, format)
}

/// Handle the any command
pub fn any(context: &mut AppContext, args: &AnyArgs, format: OutputFormat) -> Result<String> {
    pick(context, &args.pick, true, format)
}

fn pick(
    context: &mut AppContext,
    args: &PickArgs,
    allow_empty: bool,
    format: OutputFormat,
) -> Result<String> {
    if args.count == 0 {
        return Err(TroopaError::InvalidArgument(
            "count must be at least 1".to_string(),
        ));
    }

    let library = &mut context.library;
    let mut request = SampleRequest::new(args.count)
        .allow_empty(allow_empty)
        .allow_hacks(!args.no_hacks);
    if let Some(ids) = library.resolve_systems(&args.systems)? {
        request = request.systems(ids);
    }

    let games = library.random_games(&request)?;
    let entries: Vec<GameEntry> = games
        .iter()
        .map(|game| GameEntry::new(library.client(), game))
        .collect();

    output::format_games(&entries, format)
}
