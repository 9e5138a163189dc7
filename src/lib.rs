//! Recurring transaction generation for a personal finance tracker.
//!
//! A [`RecurringTemplate`] declares a schedule ("$1200 rent, monthly, from
//! Jan 1"). The [`RecurringEngine`] expands active templates into dated
//! transactions up to a horizon, skipping occurrences that already exist, so
//! it can be run again and again without creating duplicates.

pub mod calendar;
pub mod clock;
pub mod db;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod fmt;
pub mod generator;
pub mod logging;
pub mod materializer;
pub mod models;
pub mod settings;
pub mod store;
pub mod templates;

pub use clock::{Clock, FixedClock, SystemClock};
pub use engine::{EngineConfig, RecurringEngine, RunSummary};
pub use error::{CadenceError, Result};
pub use materializer::MaterializeResult;
pub use models::{
    EntryKind, Frequency, NewTemplate, RecurringTemplate, TemplateUpdate, Transaction,
    TransactionDraft,
};
pub use store::{MemoryTransactionStore, TransactionStore};
pub use templates::TemplateStore;
