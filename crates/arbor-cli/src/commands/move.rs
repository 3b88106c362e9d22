use anyhow::Result;
use arbor_core::store::TreeStore;
use owo_colors::OwoColorize;

use crate::cli::MoveCommand;
use crate::util::{label, resolve_task, resolve_task_id};

pub async fn move_task(store: &impl TreeStore, command: MoveCommand) -> Result<()> {
    let tree = store.load_tree().await?;
    let task = resolve_task(&tree, &command.id)?;
    let id = task.id.clone();
    let text = label(task).to_string();

    let new_parent = match command.parent.as_deref() {
        Some(parent) if !command.root => Some(resolve_task_id(&tree, parent)?),
        _ => None,
    };

    if let Err(reason) = tree.check_move(&id, new_parent.as_ref()) {
        println!("{} Task not moved: {}", "!".yellow().bold(), reason);
        return Ok(());
    }

    let tree = tree.move_node(&id, new_parent.as_ref());
    store.save_tree(&tree).await?;

    match new_parent.as_ref().and_then(|parent| tree.find(parent)) {
        Some(parent) => println!(
            "{} Moved '{}' under '{}'",
            "✓".green().bold(),
            text,
            label(parent)
        ),
        None => println!("{} Moved '{}' to the top level", "✓".green().bold(), text),
    }
    Ok(())
}
