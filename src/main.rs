use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "expgacha")]
#[command(about = "Exponential distribution gacha - how lucky can you get?")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.expgacha/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the local state database (defaults to ~/.expgacha/state.db)
    #[arg(long, global = true)]
    state: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Never contact the leaderboard
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Roll the gacha
    Play {
        /// Number of rounds to play
        #[arg(short = 'n', long, default_value_t = 1)]
        rounds: u32,
    },

    /// Show the odds of rolling a given score or higher
    Odds {
        /// Score to look up
        score: i64,
    },

    /// Show the top of the leaderboard and your own row
    Ranking {
        /// Number of rows to show (defaults to game.ranking_limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show your current rank
    Rank,

    /// Change your display name
    Rename {
        /// New display name
        name: String,
    },

    /// List achievements and which ones are unlocked
    Achievements,

    /// Show your client token, name and best score
    Whoami,

    /// Print a share post for your best score
    Share,

    /// Push your local best score to the leaderboard again
    Sync,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let options = cli::OpenOptions {
        config_path: cli.config,
        state_path: cli.state,
        offline: cli.offline,
    };
    let ctx = cli::open_game(&options)?;

    match cli.command {
        Some(Commands::Play { rounds }) => {
            cli::play::play_command(&ctx, rounds).await?;
        }
        Some(Commands::Odds { score }) => {
            cli::play::odds_command(&ctx, score)?;
        }
        Some(Commands::Ranking { limit, json }) => {
            cli::ranking::ranking_command(&ctx, limit, json).await?;
        }
        Some(Commands::Rank) => {
            cli::ranking::rank_command(&ctx).await?;
        }
        Some(Commands::Rename { name }) => {
            cli::profile::rename_command(&ctx, &name).await?;
        }
        Some(Commands::Achievements) => {
            cli::profile::achievements_command(&ctx)?;
        }
        Some(Commands::Whoami) => {
            cli::profile::whoami_command(&ctx)?;
        }
        Some(Commands::Share) => {
            cli::profile::share_command(&ctx).await?;
        }
        Some(Commands::Sync) => {
            cli::play::sync_command(&ctx).await?;
        }
        None => {
            // Default: a single roll
            cli::play::play_command(&ctx, 1).await?;
        }
    }

    Ok(())
}
