use crate::cli::args::{FlashArgs, FlashCommands, OutputFormat};
use crate::context::AppContext;
use crate::error::Result;
use crate::flashpoint::FlashGame;
use crate::output::{self, FlashEntry};

/// Handle the flash command
pub fn flash(context: &mut AppContext, args: &FlashArgs, format: OutputFormat) -> Result<String> {
    let client = context.flashpoint(args.collection.as_deref())?;

    let game = match &args.command {
        None | Some(FlashCommands::Random) => client.random_game()?,
        Some(FlashCommands::Url { id }) => {
            // Title and platform only if the id is in the cached list
            let known = client.games()?.iter().find(|g| &g.id == id).cloned();
            known.unwrap_or_else(|| FlashGame {
                id: id.clone(),
                title: id.clone(),
                platform: String::new(),
            })
        }
    };

    let entry = FlashEntry::new(client, &game)?;
    output::format_flash_game(&entry, format)
}
