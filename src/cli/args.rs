use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::{Deserialize, Serialize};

/// Random game picks from RetroAchievements and Flashpoint, on the
/// command line, the web and Discord
#[derive(Parser)]
#[command(name = "trophytroopa")]
#[command(version, propagate_version = true)]
#[command(about = "Random game picks from RetroAchievements and Flashpoint")]
pub struct Cli {
    /// Output format for command results
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Config file (default: ~/.trophytroopa/config.toml)
    #[arg(long, env = "TROPHYTROOPA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Print a completion script for `shell` to stdout
    pub fn print_completions(shell: Shell) {
        let mut command = Self::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    }
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Colored, human-readable output
    #[default]
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pull random games with achievements
    #[command(alias = "r")]
    Random(RandomArgs),

    /// Pull random games, including those without achievements
    Any(AnyArgs),

    /// Refetch the whole catalog and swap it in
    Update,

    /// Per-system game counts
    Stats,

    /// List systems, or find the one matching a name
    Systems(SystemsArgs),

    /// Pull a random game from a Flashpoint collection
    #[command(alias = "fp")]
    Flash(FlashArgs),

    /// Manage the local catalog cache
    Cache(CacheArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),

    /// Run the web frontend and Discord interaction endpoint
    Serve(ServeArgs),
}

/// Options shared by `random` and `any`
#[derive(Args, Clone)]
pub struct PickArgs {
    /// Number of games to pull
    #[arg(short = 'n', long, default_value = "1")]
    pub count: usize,

    /// Leave out romhacks
    #[arg(long)]
    pub no_hacks: bool,

    /// Only pull from this system (repeatable)
    #[arg(short, long = "system", value_name = "NAME")]
    pub systems: Vec<String>,
}

/// Arguments for the random command
#[derive(Args)]
pub struct RandomArgs {
    #[command(flatten)]
    pub pick: PickArgs,

    /// Include games without achievements
    #[arg(long)]
    pub empty: bool,
}

/// Arguments for the any command
#[derive(Args)]
pub struct AnyArgs {
    #[command(flatten)]
    pub pick: PickArgs,
}

/// Arguments for the systems command
#[derive(Args)]
pub struct SystemsArgs {
    /// Name or alias to resolve (e.g. "snes", "mega drive")
    pub query: Option<String>,
}

/// Arguments for the flash command
#[derive(Args)]
pub struct FlashArgs {
    /// Collection name from the config (default: first configured)
    pub collection: Option<String>,

    #[command(subcommand)]
    pub command: Option<FlashCommands>,
}

/// Flash subcommands
#[derive(Subcommand)]
pub enum FlashCommands {
    /// Pull a random game (default)
    Random,
    /// Show the links for a game id
    Url {
        /// 36-character game id
        id: String,
    },
}

/// Arguments for the cache command
#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,
}

/// Cache subcommands
#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show cache location and freshness
    Status,
    /// Delete all cached catalog and Flashpoint data
    Clear,
}

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

/// Config subcommands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (e.g., retroachievements.api_key)
        key: String,
        /// Value to set
        value: String,
    },
    /// Show configuration file path
    Path,
    /// Initialize configuration interactively
    Init,
}

/// Arguments for the completions command
#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Arguments for the serve command
#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (overrides server.bind)
    #[arg(short, long)]
    pub bind: Option<String>,
}
