//! Send log listing and statistics.

use anyhow::Result;
use mailmate_core::LogEntry;

use super::App;

pub fn log(app: &App, keyword: Option<&str>) -> Result<()> {
    let entries = app.send_log().query(keyword)?;
    if entries.is_empty() {
        eprintln!("No sent mail logged.");
    }
    for entry in &entries {
        println!("{}", format_entry(entry));
    }
    Ok(())
}

pub fn stats(app: &App) -> Result<()> {
    let entries = app.send_log().query(None)?;
    if entries.is_empty() {
        eprintln!("No sent mail logged.");
        return Ok(());
    }

    println!("Sends per day:");
    for (date, count) in mailmate_core::daily_counts(&entries) {
        println!("  {date}  {count}");
    }

    println!("\nSends per category:");
    for (category, count) in mailmate_core::category_counts(&entries) {
        println!("  {category:<12} {count}");
    }
    Ok(())
}

fn format_entry(entry: &LogEntry) -> String {
    format!(
        "{}  {} -> {}  [{}]  {}\n    {}",
        entry.timestamp_text(),
        entry.sender,
        entry.receiver,
        entry.category,
        entry.subject,
        entry.body_preview.replace('\n', "\n    ")
    )
}
