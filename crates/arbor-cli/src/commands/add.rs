use anyhow::{anyhow, Result};
use arbor_core::error::CoreError;
use arbor_core::models::{TaskUpdate, SHORT_ID_LEN};
use arbor_core::store::TreeStore;
use chrono::NaiveDate;
use owo_colors::{OwoColorize, Style};

use crate::cli::AddCommand;
use crate::parser::parse_date;
use crate::util::resolve_task_id;
use crate::views::table::describe_day;

pub async fn add_task(store: &impl TreeStore, command: AddCommand, today: NaiveDate) -> Result<()> {
    let tree = store.load_tree().await?;
    let selected = command
        .date
        .as_deref()
        .map(|d| parse_date(d, today))
        .transpose()?
        .unwrap_or(today);

    let (tree, id) = match &command.parent {
        Some(parent) => {
            let parent_id = resolve_task_id(&tree, parent)?;
            let (tree, id) = tree.insert_child(&parent_id, selected, today);
            let id = id.ok_or_else(|| anyhow!(CoreError::NotFound(parent_id.to_string())))?;
            (tree, id)
        }
        None => tree.insert_root(selected, today),
    };

    let update = TaskUpdate {
        text: Some(command.text),
        ..Default::default()
    };
    let tree = tree.update_task(&id, update, None, today);
    store.save_tree(&tree).await?;

    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();
    let added = tree
        .find(&id)
        .ok_or_else(|| anyhow!(CoreError::NotFound(id.to_string())))?;

    println!(
        "{} Created task: {}",
        "✓".style(success_style),
        added.text.bright_white().bold()
    );
    println!(
        "  {} Task ID: {}",
        "→".style(info_style),
        tree.short_id(&id, SHORT_ID_LEN).yellow()
    );
    if let Some(parent) = tree.parent_of(&id) {
        println!("  {} Under: {}", "→".style(info_style), parent.text);
    }
    if let Some(day) = added.scheduled_date {
        println!(
            "  {} Scheduled: {}",
            "→".style(info_style),
            describe_day(day, today).cyan()
        );
    }

    Ok(())
}
