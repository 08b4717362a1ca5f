use anyhow::Result;
use clap::{Parser, Subcommand};

use leaguesim_backend::{api, cli, db};

#[derive(Parser)]
#[command(name = "leaguesim")]
#[command(about = "A football league simulation and prediction platform")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },
    /// Initialize the database
    InitDb,
    /// Seed the default league teams
    Seed,
    /// Generate the season fixtures
    Schedule,
    /// Simulate the current week
    Play,
    /// Simulate every remaining match
    PlayAll,
    /// Show the league table
    Standings,
    /// Show championship chances
    Predict,
    /// Clear all results, keeping the schedule
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => {
            tracing::info!("Starting LeagueSim API server on port {}", port);
            api::serve(port).await?;
        }
        Some(Commands::InitDb) => {
            tracing::info!("Initializing database...");
            db::init_database().await?;
        }
        Some(Commands::Seed) => {
            cli::seed().await?;
        }
        Some(Commands::Schedule) => {
            cli::schedule().await?;
        }
        Some(Commands::Play) => {
            cli::play_week().await?;
        }
        Some(Commands::PlayAll) => {
            cli::play_all().await?;
        }
        Some(Commands::Standings) => {
            cli::standings().await?;
        }
        Some(Commands::Predict) => {
            cli::predict().await?;
        }
        Some(Commands::Reset) => {
            cli::reset().await?;
        }
        None => {
            // Default to serving
            tracing::info!("Starting LeagueSim API server on port 3000");
            api::serve(3000).await?;
        }
    }

    Ok(())
}
