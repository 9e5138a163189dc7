pub mod init;
pub mod run;
pub mod status;
pub mod templates;
pub mod transactions;

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

use cadence::db::{get_connection, init_db, SqliteTransactionStore};
use cadence::settings::Settings;
use cadence::{
    Clock, EntryKind, Frequency, RecurringEngine, Result, SystemClock, TemplateStore,
};

#[derive(Parser)]
#[command(name = "cadence", about = "Recurring incomes and expenses, generated ahead of time.")]
pub struct Cli {
    /// Use this data directory instead of the configured one
    #[arg(long = "data-dir", global = true)]
    pub data_dir: Option<String>,
    /// Print engine logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory and database.
    Init,
    /// Manage recurring income templates.
    Income {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Manage recurring expense templates.
    Expense {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Generate all pending recurring records.
    Run {
        /// Only templates of this profile
        #[arg(long)]
        profile: Option<String>,
    },
    /// List stored transactions for a profile.
    Transactions {
        #[arg(long)]
        profile: String,
        /// income or expense (default: both)
        #[arg(long)]
        kind: Option<EntryKind>,
    },
    /// Show data location, template and transaction counts.
    Status {
        #[arg(long)]
        profile: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Declare a recurring template and generate its records.
    Add {
        #[arg(long)]
        profile: String,
        #[arg(long)]
        description: String,
        #[arg(long, allow_hyphen_values = true)]
        amount: Decimal,
        /// weekly, fortnightly or monthly
        #[arg(long)]
        frequency: Frequency,
        /// First occurrence: YYYY-MM-DD
        #[arg(long)]
        start: NaiveDate,
        /// Last possible occurrence: YYYY-MM-DD
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Category id (expenses only)
        #[arg(long)]
        category: Option<String>,
        /// Only save the template
        #[arg(long = "no-generate")]
        no_generate: bool,
    },
    /// List templates.
    List {
        #[arg(long)]
        profile: Option<String>,
        /// Hide deactivated templates
        #[arg(long)]
        active: bool,
    },
    /// Edit template fields.
    Update {
        id: String,
        #[arg(long)]
        profile: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<Decimal>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        frequency: Option<Frequency>,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long, conflicts_with = "clear_end")]
        end: Option<NaiveDate>,
        /// Remove the end date
        #[arg(long = "clear-end")]
        clear_end: bool,
    },
    /// Stop generating records for a template.
    Deactivate { id: String },
    /// Remove a template permanently. Generated records are kept.
    Delete { id: String },
    /// Generate a template's records now.
    Generate {
        id: String,
        /// Months ahead of today (default: configured horizon)
        #[arg(long)]
        months: Option<u32>,
    },
}

/// Both engines over one data directory.
pub struct Books {
    pub settings: Settings,
    pub income: RecurringEngine,
    pub expense: RecurringEngine,
}

impl Books {
    pub fn open(settings: Settings) -> Result<Self> {
        let data_dir = settings.data_path();
        std::fs::create_dir_all(&data_dir)?;

        let conn = get_connection(&settings.db_path())?;
        init_db(&conn)?;
        let conn = Arc::new(Mutex::new(conn));
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let engine = |kind: EntryKind| {
            RecurringEngine::new(
                TemplateStore::on_disk(kind, data_dir.clone(), clock.clone()),
                Arc::new(SqliteTransactionStore::new(conn.clone(), kind)),
                clock.clone(),
                settings.engine_config(),
            )
        };
        let income = engine(EntryKind::Income)?;
        let expense = engine(EntryKind::Expense)?;

        Ok(Self {
            settings,
            income,
            expense,
        })
    }

    pub fn engine(&self, kind: EntryKind) -> &RecurringEngine {
        match kind {
            EntryKind::Income => &self.income,
            EntryKind::Expense => &self.expense,
        }
    }

    pub fn engines(&self) -> [&RecurringEngine; 2] {
        [&self.income, &self.expense]
    }
}
