use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{EntryKind, RecurringTemplate, Transaction};

/// Does `txn` look like an occurrence of `template`?
///
/// Rows that record their source template are matched on that id alone.
/// Rows without one (manual entries, or rows written before provenance was
/// recorded) fall back to exact content: description, amount and, for
/// expenses, category. The fallback conflates templates with identical
/// content, and a description edit orphans the rows generated before it.
pub fn is_occurrence_of(txn: &Transaction, template: &RecurringTemplate) -> bool {
    if txn.kind != template.kind {
        return false;
    }
    match txn.source_template_id.as_deref() {
        Some(source) => source == template.id,
        None => {
            txn.description == template.description
                && txn.amount == template.amount
                && (template.kind == EntryKind::Income || txn.category_id == template.category_id)
        }
    }
}

/// Calendar days on which `template` already has a materialized transaction.
pub fn existing_occurrence_dates(
    transactions: &[Transaction],
    template: &RecurringTemplate,
) -> HashSet<NaiveDate> {
    transactions
        .iter()
        .filter(|t| is_occurrence_of(t, template))
        .map(|t| t.date)
        .collect()
}
