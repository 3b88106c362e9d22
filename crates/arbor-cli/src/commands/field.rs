use anyhow::{anyhow, Result};
use arbor_core::error::CoreError;
use arbor_core::models::{Field, TaskUpdate};
use arbor_core::store::TreeStore;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::cli::{FieldCommand, FieldSubcommand};
use crate::util::{label, resolve_task};

pub async fn field_command(store: &impl TreeStore, command: FieldCommand, today: NaiveDate) -> Result<()> {
    let tree = store.load_tree().await?;

    match command.command {
        FieldSubcommand::Set(cmd) => {
            let task = resolve_task(&tree, &cmd.id)?;
            let (id, text) = (task.id.clone(), label(task).to_string());
            let update = TaskUpdate {
                set_fields: vec![Field {
                    key: cmd.key.clone(),
                    value: cmd.value.clone(),
                }],
                ..Default::default()
            };
            let tree = tree.update_task(&id, update, None, today);
            store.save_tree(&tree).await?;
            println!(
                "{} {} = {} on '{}'",
                "✓".green().bold(),
                cmd.key.yellow(),
                cmd.value,
                text
            );
        }
        FieldSubcommand::Remove(cmd) => {
            let task = resolve_task(&tree, &cmd.id)?;
            if task.field(&cmd.key).is_none() {
                return Err(anyhow!(CoreError::NotFound(format!(
                    "Task '{}' has no field '{}'",
                    label(task),
                    cmd.key
                ))));
            }
            let (id, text) = (task.id.clone(), label(task).to_string());
            let update = TaskUpdate {
                remove_fields: vec![cmd.key.clone()],
                ..Default::default()
            };
            let tree = tree.update_task(&id, update, None, today);
            store.save_tree(&tree).await?;
            println!("{} Removed {} from '{}'", "✓".green().bold(), cmd.key.yellow(), text);
        }
    }
    Ok(())
}
