use std::path::PathBuf;

use clap::{Parser, Subcommand};
use cortex_cli::commands::{ConfigCommand, ConversationCommand, ImportCommand, StatsCommand};
use cortex_cli::error::CliResult;
use cortex_cli::output::OutputFormat;
use cortex_memory::config::Config;
use cortex_memory::storage::open_store;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cortex")]
#[command(about = "CORTEX - Import, enrich and query AI conversation transcripts")]
#[command(version)]
pub struct Cli {
    #[clap(long, short, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[clap(long, short = 'd', global = true, help = "Path to data directory")]
    pub data_dir: Option<PathBuf>,

    #[clap(long, short = 'c', global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Import a conversation transcript")]
    Import(ImportCommand),

    #[clap(about = "Browse stored conversations")]
    Conversation(ConversationCommand),

    #[clap(about = "Show storage statistics")]
    Stats(StatsCommand),

    #[clap(about = "Configuration commands")]
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> CliResult<()> {
    init_logging();

    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };

    if let Command::Config(cmd) = &cli.command {
        return cmd.execute(cli.config.as_deref(), format);
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    let store = open_store(&config.storage)?;
    tracing::debug!(backend = ?config.storage.backend, "Store opened");

    match &cli.command {
        Command::Import(cmd) => cmd.execute(store, &config, format),
        Command::Conversation(cmd) => cmd.execute(store.as_ref(), format),
        Command::Stats(cmd) => cmd.execute(store.as_ref(), format),
        Command::Config(_) => unreachable!(),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,cortex_memory=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
