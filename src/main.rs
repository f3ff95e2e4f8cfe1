use std::sync::Arc;

use clap::Parser;
use colored::{control::set_override, Colorize};
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

use trophytroopa::cache::HttpTransport;
use trophytroopa::cli::args::{Cli, Commands, CompletionsArgs};
use trophytroopa::cli::commands;
use trophytroopa::config::{Config, Paths};
use trophytroopa::context::AppContext;
use trophytroopa::error::TroopaError;
use trophytroopa::web;

fn main() {
    // Respect NO_COLOR environment variable (https://no-color.org/)
    // Also disable colors when stdout is not a terminal (for piping)
    if std::env::var("NO_COLOR").is_ok() || !std::io::stdout().is_terminal() {
        set_override(false);
    }

    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}

/// Logs go to stderr; RUST_LOG wins over the verbosity flag
fn init_logging(verbose: bool, serving: bool) {
    let default_level = match (verbose, serving) {
        (true, _) => "debug",
        (false, true) => "info",
        (false, false) => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<(), TroopaError> {
    let cli = Cli::parse();
    let format = cli.output;

    // Handle completions command early (no config or client needed)
    if let Commands::Completions(CompletionsArgs { shell }) = &cli.command {
        Cli::print_completions(*shell);
        return Ok(());
    }

    init_logging(cli.verbose, matches!(cli.command, Commands::Serve(_)));

    let paths = Paths::resolve(cli.config.as_deref())?;
    let mut config = Config::load_from(&paths)?;

    // Config commands work on the file alone
    if let Commands::Config(args) = &cli.command {
        let output = commands::config(&mut config, &paths, args, format)?;
        print_output(&output);
        return Ok(());
    }

    if let Commands::Serve(args) = &cli.command {
        if let Some(bind) = &args.bind {
            config.server.bind = bind.clone();
        }
    }

    let transport = Arc::new(HttpTransport::new()?);
    let mut context = AppContext::from_config(&config, transport)?;

    let output = match &cli.command {
        Commands::Random(args) => commands::random(&mut context, args, format)?,
        Commands::Any(args) => commands::any(&mut context, args, format)?,
        Commands::Update => commands::update(&config, &mut context, format)?,
        Commands::Stats => commands::stats(&mut context, format)?,
        Commands::Systems(args) => commands::systems(&mut context, args, format)?,
        Commands::Flash(args) => commands::flash(&mut context, args, format)?,
        Commands::Cache(args) => commands::cache(&config, &context, args, format)?,
        Commands::Serve(_) => {
            web::serve(&config, context)?;
            String::new()
        }
        Commands::Config(_) | Commands::Completions(_) => unreachable!(), // Handled above
    };

    print_output(&output);
    Ok(())
}

fn print_output(output: &str) {
    if !output.is_empty() {
        println!("{output}");
    }
}
