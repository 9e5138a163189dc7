use colored::Colorize;
use comfy_table::{Cell, Table};

use cadence::fmt::money;
use cadence::{EntryKind, MaterializeResult, NewTemplate, RecurringEngine, Result, TemplateUpdate};

use super::{Books, TemplateCommands};

fn report_generation(kind: EntryKind, result: MaterializeResult) {
    println!("Generated {} {kind} record(s)", result.created);
    if result.failed > 0 {
        println!(
            "{}",
            format!("{} record(s) could not be saved; they will be retried on the next run", result.failed)
                .yellow()
        );
    }
}

pub async fn run(books: &Books, kind: EntryKind, command: TemplateCommands) -> Result<()> {
    let engine = books.engine(kind);
    match command {
        TemplateCommands::Add {
            profile,
            description,
            amount,
            frequency,
            start,
            end,
            category,
            no_generate,
        } => {
            let id = engine.add_template(NewTemplate {
                profile_id: profile,
                description,
                amount,
                category_id: category,
                frequency,
                start_date: start,
                end_date: end,
            })?;
            println!("Added {kind} template {id}");
            if !no_generate {
                let result = engine.force_generate(&id, None).await?;
                report_generation(kind, result);
            }
            Ok(())
        }
        TemplateCommands::List { profile, active } => list(engine, profile.as_deref(), active),
        TemplateCommands::Update {
            id,
            profile,
            description,
            amount,
            category,
            frequency,
            start,
            end,
            clear_end,
        } => {
            let end_date = if clear_end { Some(None) } else { end.map(Some) };
            let updated = engine.update_template(
                &id,
                TemplateUpdate {
                    profile_id: profile,
                    description,
                    amount,
                    category_id: category,
                    frequency,
                    start_date: start,
                    end_date,
                },
            )?;
            println!("Updated {kind} template {}", updated.id);
            Ok(())
        }
        TemplateCommands::Deactivate { id } => {
            if engine.deactivate_template(&id)? {
                println!("Deactivated {kind} template {id}");
            } else {
                println!("{kind} template {id} was already inactive");
            }
            Ok(())
        }
        TemplateCommands::Delete { id } => {
            engine.delete_template(&id)?;
            println!("Deleted {kind} template {id}");
            Ok(())
        }
        TemplateCommands::Generate { id, months } => {
            let horizon = match months {
                Some(m) => engine.horizon_for(m)?,
                None => engine.horizon()?,
            };
            let result = engine.force_generate(&id, Some(horizon)).await?;
            report_generation(kind, result);
            Ok(())
        }
    }
}

fn list(engine: &RecurringEngine, profile: Option<&str>, active_only: bool) -> Result<()> {
    let kind = engine.kind();
    let templates: Vec<_> = engine
        .list_templates(profile)?
        .into_iter()
        .filter(|t| !active_only || t.is_active)
        .collect();

    if templates.is_empty() {
        println!("No {kind} templates.");
        return Ok(());
    }

    let mut table = Table::new();
    let mut header = vec!["ID", "Profile", "Description", "Amount", "Frequency", "Start", "End", "Active"];
    if kind == EntryKind::Expense {
        header.insert(4, "Category");
    }
    table.set_header(header);
    for t in &templates {
        let mut row = vec![
            Cell::new(&t.id),
            Cell::new(&t.profile_id),
            Cell::new(&t.description),
            Cell::new(money(t.amount)),
            Cell::new(t.frequency),
            Cell::new(t.start_date),
            Cell::new(t.end_date.map(|d| d.to_string()).unwrap_or_default()),
            Cell::new(if t.is_active { "yes" } else { "no" }),
        ];
        if kind == EntryKind::Expense {
            row.insert(4, Cell::new(t.category_id.as_deref().unwrap_or("")));
        }
        table.add_row(row);
    }
    println!("Recurring {kind} templates\n{table}");

    if let Some(p) = profile {
        println!("Monthly equivalent: {}", money(engine.monthly_recurring_total(p)?));
    }
    Ok(())
}
