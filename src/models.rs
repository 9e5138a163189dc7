use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CadenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Weekly,
    Fortnightly,
    Monthly,
    /// Manually logged entries. Never valid on a recurring template.
    OneTime,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Weekly => "weekly",
            Frequency::Fortnightly => "fortnightly",
            Frequency::Monthly => "monthly",
            Frequency::OneTime => "one-time",
        }
    }

    pub fn is_recurring(&self) -> bool {
        !matches!(self, Frequency::OneTime)
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "weekly" => Ok(Frequency::Weekly),
            "fortnightly" => Ok(Frequency::Fortnightly),
            "monthly" => Ok(Frequency::Monthly),
            "one-time" | "onetime" | "one_time" => Ok(Frequency::OneTime),
            other => Err(CadenceError::UnsupportedFrequency(other.to_string())),
        }
    }
}

/// Which ledger a template or transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }

    /// Namespace key of the persisted template slot.
    pub fn storage_key(&self) -> &'static str {
        match self {
            EntryKind::Income => "recurring_incomes",
            EntryKind::Expense => "recurring_expenses",
        }
    }

    pub(crate) fn id_prefix(&self) -> &'static str {
        match self {
            EntryKind::Income => "recurring",
            EntryKind::Expense => "recurring_expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "incomes" => Ok(EntryKind::Income),
            "expense" | "expenses" => Ok(EntryKind::Expense),
            other => Err(CadenceError::Other(format!("Unknown kind: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTemplate {
    pub id: String,
    pub kind: EntryKind,
    pub profile_id: String,
    pub description: String,
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

/// Fields supplied when declaring a new template.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub profile_id: String,
    pub description: String,
    pub amount: Decimal,
    pub category_id: Option<String>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// Partial edit. `end_date: Some(None)` clears the end date.
#[derive(Debug, Clone, Default)]
pub struct TemplateUpdate {
    pub profile_id: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category_id: Option<String>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    pub kind: EntryKind,
    pub profile_id: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: Option<String>,
    pub frequency: Option<Frequency>,
    /// Template that produced this row. `None` for manual or legacy rows.
    pub source_template_id: Option<String>,
}

/// A transaction that has not been persisted yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub kind: EntryKind,
    pub profile_id: String,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: Option<String>,
    pub frequency: Option<Frequency>,
    pub source_template_id: Option<String>,
}

impl TransactionDraft {
    pub fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            profile_id: self.profile_id,
            description: self.description,
            amount: self.amount,
            date: self.date,
            category_id: self.category_id,
            frequency: self.frequency,
            source_template_id: self.source_template_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_parse() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!("Fortnightly".parse::<Frequency>().unwrap(), Frequency::Fortnightly);
        assert_eq!(" monthly ".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!("one-time".parse::<Frequency>().unwrap(), Frequency::OneTime);
        assert!(matches!(
            "yearly".parse::<Frequency>(),
            Err(CadenceError::UnsupportedFrequency(_))
        ));
    }

    #[test]
    fn test_frequency_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&Frequency::OneTime).unwrap(), "\"one-time\"");
        let f: Frequency = serde_json::from_str("\"fortnightly\"").unwrap();
        assert_eq!(f, Frequency::Fortnightly);
    }

    #[test]
    fn test_kind_storage_keys_differ() {
        assert_ne!(EntryKind::Income.storage_key(), EntryKind::Expense.storage_key());
        assert_eq!("expenses".parse::<EntryKind>().unwrap(), EntryKind::Expense);
    }
}
