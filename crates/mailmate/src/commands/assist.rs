//! Model-backed commands: research, plan, todo and draft.

use std::io::{self, Read};

use anyhow::{Context, Result};

use super::App;
use crate::cli::DraftArgs;

pub async fn research(app: &App, topic: &str) -> Result<()> {
    match app.assistant()?.research(topic).await? {
        Some(report) => println!("{report}"),
        None => eprintln!("No results found for \"{topic}\"."),
    }
    Ok(())
}

pub async fn plan(app: &App, goal: &str) -> Result<()> {
    let tasks = app.assistant()?.break_down(goal).await?;
    println!("{tasks}");
    Ok(())
}

pub async fn todo(app: &App, items: Vec<String>) -> Result<()> {
    let items = if items.is_empty() {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read to-do items from stdin")?;
        split_items(&input)
    } else {
        items
    };

    match app.assistant()?.prioritize(&items).await? {
        Some(sorted) => println!("{sorted}"),
        None => eprintln!("No to-do items given."),
    }
    Ok(())
}

pub async fn draft(app: &App, args: DraftArgs) -> Result<()> {
    let draft = app
        .assistant()?
        .compose(&args.description, args.language, &args.tone)
        .await?;
    let json = serde_json::to_string_pretty(&draft)?;

    match args.out {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Subject: {}\n\n{}", draft.subject(), draft.body());
            eprintln!("Draft saved to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// One item per non-blank line.
fn split_items(input: &str) -> Vec<String> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
