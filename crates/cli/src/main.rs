//! voxintent CLI: the main entry point.
//!
//! Commands:
//! - `classify`: Classify one message, or read utterances interactively
//! - `prompt`: Print the system prompt built from the configured catalog
//! - `config`: Print a default configuration file
//! - `doctor`: Check credentials and reach the configured provider

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "voxintent",
    about = "voxintent: intent classification for voice assistants",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify an utterance into a function call
    Classify {
        /// Session (device) identifier used for caching
        #[arg(short, long, default_value = "cli")]
        session: String,

        /// Classify a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Print the system prompt for the configured actions
    Prompt,

    /// Print a default config.toml
    Config,

    /// Diagnose config, credentials and provider reachability
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Classify { session, message } => commands::classify::run(session, message).await?,
        Commands::Prompt => commands::prompt::run()?,
        Commands::Config => commands::config_cmd::run(),
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
