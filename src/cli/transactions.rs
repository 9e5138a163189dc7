use comfy_table::{Cell, Table};

use cadence::fmt::money;
use cadence::{EntryKind, Result};

use super::Books;

pub async fn list(books: &Books, profile: &str, kind: Option<EntryKind>) -> Result<()> {
    let kinds = match kind {
        Some(k) => vec![k],
        None => vec![EntryKind::Income, EntryKind::Expense],
    };

    let mut rows = Vec::new();
    for k in kinds {
        rows.extend(books.engine(k).transactions().list(profile).await?);
    }
    rows.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.description.cmp(&b.description)));

    if rows.is_empty() {
        println!("No transactions for profile {profile}.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Kind", "Description", "Amount", "Category", "Frequency", "Template"]);
    for t in &rows {
        table.add_row(vec![
            Cell::new(t.date),
            Cell::new(t.kind),
            Cell::new(&t.description),
            Cell::new(money(t.amount)),
            Cell::new(t.category_id.as_deref().unwrap_or("")),
            Cell::new(t.frequency.map(|f| f.to_string()).unwrap_or_default()),
            Cell::new(t.source_template_id.as_deref().unwrap_or("")),
        ]);
    }
    println!("Transactions for {profile}\n{table}");
    println!("{} row(s)", rows.len());
    Ok(())
}
