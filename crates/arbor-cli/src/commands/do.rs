use anyhow::{anyhow, Result};
use arbor_core::date::format_day;
use arbor_core::error::CoreError;
use arbor_core::store::TreeStore;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::cli::DoCommand;
use crate::parser::parse_date;
use crate::util::{label, resolve_task};
use crate::views::table::describe_day;

pub async fn do_task(store: &impl TreeStore, command: DoCommand, today: NaiveDate) -> Result<()> {
    set_completion(store, command, today, true).await
}

pub async fn undo_task(store: &impl TreeStore, command: DoCommand, today: NaiveDate) -> Result<()> {
    set_completion(store, command, today, false).await
}

async fn set_completion(
    store: &impl TreeStore,
    command: DoCommand,
    today: NaiveDate,
    completed: bool,
) -> Result<()> {
    let tree = store.load_tree().await?;
    let for_date = command
        .date
        .as_deref()
        .map(|d| parse_date(d, today))
        .transpose()?
        .unwrap_or(today);

    let task = resolve_task(&tree, &command.id)?;
    let id = task.id.clone();
    let previous_schedule = task.scheduled_date;

    let tree = tree.toggle_completion(&id, completed, for_date);
    store.save_tree(&tree).await?;

    let task = tree
        .find(&id)
        .ok_or_else(|| anyhow!(CoreError::NotFound(id.to_string())))?;
    if completed {
        println!(
            "{} Completed task: '{}' for {}",
            "✓".green().bold(),
            label(task),
            format_day(for_date)
        );
    } else {
        println!(
            "{} Reopened task: '{}' for {}",
            "↺".yellow().bold(),
            label(task),
            format_day(for_date)
        );
    }

    if task.is_recurring() && task.scheduled_date != previous_schedule {
        if let Some(next) = task.scheduled_date {
            println!("  {} Next occurrence: {}", "→".blue(), describe_day(next, today).cyan());
        }
    }

    Ok(())
}
