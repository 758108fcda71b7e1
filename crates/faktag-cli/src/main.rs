//! CLI application for Polish invoice tagging.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, buyers, categories, classify, config, counter, process, Settings};

/// Polish invoice tagging - extract fields, classify vendors and assign labels
#[derive(Parser)]
#[command(name = "faktag")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Path to the JSON store (overrides the config)
    #[arg(short, long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single invoice file
    Process(process::ProcessArgs),

    /// Process multiple invoice files
    Batch(batch::BatchArgs),

    /// Inspect or reset buyer counters
    Counter(counter::CounterArgs),

    /// Classify a vendor without processing a document
    Classify(classify::ClassifyArgs),

    /// List categories and selectable codes
    Categories(categories::CategoriesArgs),

    /// Manage remembered buyers
    Buyers(buyers::BuyersArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let settings = Settings::new(cli.config, cli.store);

    match cli.command {
        Commands::Process(args) => process::run(args, &settings).await,
        Commands::Batch(args) => batch::run(args, &settings).await,
        Commands::Counter(args) => counter::run(args, &settings).await,
        Commands::Classify(args) => classify::run(args, &settings),
        Commands::Categories(args) => categories::run(args),
        Commands::Buyers(args) => buyers::run(args, &settings).await,
        Commands::Config(args) => config::run(args, &settings).await,
    }
}
