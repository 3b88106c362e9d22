use anyhow::{anyhow, Result};
use arbor_core::error::CoreError;
use arbor_core::models::TaskUpdate;
use arbor_core::store::TreeStore;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::cli::EditCommand;
use crate::parser::parse_date;
use crate::util::{label, resolve_task_id};

pub async fn edit_task(store: &impl TreeStore, command: EditCommand, today: NaiveDate) -> Result<()> {
    let tree = store.load_tree().await?;
    let id = resolve_task_id(&tree, &command.id)?;

    let scheduled_date = if command.unschedule {
        Some(None)
    } else {
        command
            .schedule
            .as_deref()
            .map(|d| parse_date(d, today).map(Some))
            .transpose()?
    };

    let update = TaskUpdate {
        text: command.text,
        scheduled_date,
        ..Default::default()
    };
    if update.text.is_none() && update.scheduled_date.is_none() {
        return Err(anyhow!(CoreError::InvalidInput(
            "Nothing to edit. Use --text, --schedule or --unschedule.".to_string()
        )));
    }

    let tree = tree.update_task(&id, update, None, today);
    store.save_tree(&tree).await?;

    let task = tree
        .find(&id)
        .ok_or_else(|| anyhow!(CoreError::NotFound(id.to_string())))?;
    println!("{} Updated task: '{}'", "✓".green().bold(), label(task));
    Ok(())
}
