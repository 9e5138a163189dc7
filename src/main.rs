mod cli;

use clap::Parser;
use tracing::Level;

use cadence::logging::{parse_level, setup_logging};
use cadence::settings::{load_settings, shellexpand_path, Settings};
use cadence::{EntryKind, Result};
use cli::{Books, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = shellexpand_path(dir);
    }

    let file_level = parse_level(&settings.log_level);
    let console_level = if cli.verbose { file_level } else { Level::WARN };
    let log_dir = settings.log_dir();
    let log_dir = std::fs::create_dir_all(&log_dir).is_ok().then_some(log_dir);
    setup_logging(console_level, file_level, log_dir.as_deref());

    let persist_data_dir = cli.data_dir.is_some();
    let result = run(settings, cli.command, persist_data_dir).await;

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(settings: Settings, command: Commands, persist_data_dir: bool) -> Result<()> {
    let books = Books::open(settings)?;
    match command {
        Commands::Init => cli::init::run(&books, persist_data_dir),
        Commands::Income { command } => cli::templates::run(&books, EntryKind::Income, command).await,
        Commands::Expense { command } => cli::templates::run(&books, EntryKind::Expense, command).await,
        Commands::Run { profile } => cli::run::run(&books, profile.as_deref()).await,
        Commands::Transactions { profile, kind } => cli::transactions::list(&books, &profile, kind).await,
        Commands::Status { profile } => cli::status::run(&books, profile.as_deref()),
    }
}
