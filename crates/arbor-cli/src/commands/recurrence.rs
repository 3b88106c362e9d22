use anyhow::{anyhow, Result};
use arbor_core::date::{format_day, weekday_ordinal};
use arbor_core::error::CoreError;
use arbor_core::models::{Frequency, Recurrence, TaskUpdate, WeekdaySet};
use arbor_core::recurrence::upcoming_occurrences;
use arbor_core::store::TreeStore;
use chrono::NaiveDate;
use owo_colors::{OwoColorize, Style};

use crate::cli::{
    RecurrenceClearCommand, RecurrenceCommand, RecurrencePreviewCommand, RecurrenceSetCommand,
    RecurrenceSubcommand,
};
use crate::config::Config;
use crate::util::{label, resolve_task};
use crate::views::table::describe_day;

/// Upper bound on `recur preview --count`.
const MAX_PREVIEW_COUNT: usize = 1000;

pub async fn recurrence_command(
    store: &impl TreeStore,
    command: RecurrenceCommand,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    match command.command {
        RecurrenceSubcommand::Set(cmd) => set_recurrence(store, cmd, today).await,
        RecurrenceSubcommand::Clear(cmd) => clear_recurrence(store, cmd, today).await,
        RecurrenceSubcommand::Preview(cmd) => preview_recurrence(store, cmd, config, today).await,
    }
}

async fn set_recurrence(
    store: &impl TreeStore,
    command: RecurrenceSetCommand,
    today: NaiveDate,
) -> Result<()> {
    let tree = store.load_tree().await?;
    let task = resolve_task(&tree, &command.id)?;
    let id = task.id.clone();
    let frequency = Frequency::from(command.every);

    let days = match (&command.on, frequency) {
        (Some(on), Frequency::Weekly) => on
            .parse::<WeekdaySet>()
            .map_err(|e| anyhow!(CoreError::InvalidInput(e.to_string())))?,
        (Some(_), _) => {
            return Err(anyhow!(CoreError::InvalidInput(
                "--on only applies to weekly rules".to_string()
            )))
        }
        (None, _) => WeekdaySet::empty(),
    };
    // A weekly rule without weekdays would never occur; repeat on the anchor's weekday.
    let days = if frequency == Frequency::Weekly && days.is_empty() {
        let anchor = task.anchor().or(task.scheduled_date).unwrap_or(today);
        [weekday_ordinal(anchor)].into_iter().collect()
    } else {
        days
    };

    let rule = Recurrence::new(frequency, command.interval, days);
    let update = TaskUpdate {
        recurrence: Some(Some(rule.clone())),
        ..Default::default()
    };
    let tree = tree.update_task(&id, update, None, today);
    store.save_tree(&tree).await?;

    let task = tree
        .find(&id)
        .ok_or_else(|| anyhow!(CoreError::NotFound(id.to_string())))?;
    println!(
        "{} '{}' now repeats {}",
        "↻".green().bold(),
        label(task),
        rule.to_string().cyan()
    );
    if let Some(anchor) = task.anchor() {
        println!("  {} Starting: {}", "→".blue(), describe_day(anchor, today));
    }
    Ok(())
}

async fn clear_recurrence(
    store: &impl TreeStore,
    command: RecurrenceClearCommand,
    today: NaiveDate,
) -> Result<()> {
    let tree = store.load_tree().await?;
    let task = resolve_task(&tree, &command.id)?;
    let id = task.id.clone();
    let text = label(task).to_string();

    if !task.is_recurring() {
        println!("Task '{text}' does not repeat.");
        return Ok(());
    }

    let update = TaskUpdate {
        recurrence: Some(None),
        ..Default::default()
    };
    let tree = tree.update_task(&id, update, None, today);
    store.save_tree(&tree).await?;

    println!("{} '{}' no longer repeats", "✓".green().bold(), text);
    Ok(())
}

async fn preview_recurrence(
    store: &impl TreeStore,
    command: RecurrencePreviewCommand,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    let tree = store.load_tree().await?;
    let task = resolve_task(&tree, &command.id)?;
    let Some(rule) = task.recurrence() else {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "Task '{}' does not repeat",
            label(task)
        ))));
    };

    let count = command.count.unwrap_or(config.list.preview_count);
    if count > MAX_PREVIEW_COUNT {
        return Err(anyhow!(CoreError::InvalidInput(format!(
            "Preview count must be at most {MAX_PREVIEW_COUNT}, got {count}"
        ))));
    }
    // Occurrences on or after today.
    let after = today.pred_opt().unwrap_or(today);
    let dates = upcoming_occurrences(task, after, count);

    let header_style = Style::new().bold();
    println!(
        "{} {}",
        label(task).style(header_style),
        format!("({rule})").bright_black()
    );
    if dates.is_empty() {
        println!("  No upcoming occurrences.");
        return Ok(());
    }
    for date in dates {
        let marker = if task.is_completed_on(date) { "✓" } else { "•" };
        println!(
            "  {} {} {}",
            marker,
            format_day(date),
            date.format("%a").to_string().bright_black()
        );
    }
    Ok(())
}
