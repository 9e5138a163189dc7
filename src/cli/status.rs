use cadence::db::{count_transactions, get_connection};
use cadence::fmt::money;
use cadence::Result;

use super::Books;

pub fn run(books: &Books, profile: Option<&str>) -> Result<()> {
    let settings = &books.settings;
    println!("Data dir:   {}", settings.data_path().display());
    println!("Database:   {}", settings.db_path().display());
    println!("Horizon:    {} month(s), through {}", settings.horizon_months, books.income.horizon()?);
    println!("Run covers: {} month(s), through {}", settings.run_horizon_months, books.income.run_horizon()?);
    if let Some(p) = profile {
        println!("Profile:    {p}");
    }
    println!();

    for engine in books.engines() {
        let templates = engine.list_templates(profile)?;
        let active = templates.iter().filter(|t| t.is_active).count();
        println!(
            "{:<9} {} template(s), {} active",
            format!("{}:", engine.kind()),
            templates.len(),
            active
        );
        if let Some(p) = profile {
            println!("          {} per month", money(engine.monthly_recurring_total(p)?));
        }
    }

    let conn = get_connection(&settings.db_path())?;
    let counts = count_transactions(&conn, profile)?;
    println!();
    if counts.is_empty() {
        println!("Transactions:  0");
    }
    for (kind, count) in counts {
        println!("Transactions ({kind}): {count}");
    }
    Ok(())
}
