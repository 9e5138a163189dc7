use colored::Colorize;

use cadence::Result;

use super::Books;

pub async fn run(books: &Books, profile: Option<&str>) -> Result<()> {
    for engine in books.engines() {
        let summary = engine.run_pending(profile).await;
        if summary.already_running {
            println!("{}: already running", engine.kind());
            continue;
        }
        println!(
            "{}: {} template(s), {} record(s) created",
            engine.kind(),
            summary.templates,
            summary.created
        );
        if summary.failed > 0 || summary.skipped_templates > 0 {
            println!(
                "{}",
                format!(
                    "  {} record(s) failed, {} template(s) skipped; retry with `cadence run`",
                    summary.failed, summary.skipped_templates
                )
                .yellow()
            );
        }
    }
    Ok(())
}
