use anyhow::Result;
use arbor_core::store::TreeStore;
use dialoguer::Confirm;
use std::io::ErrorKind;
use tracing::debug;

use crate::cli::DeleteCommand;
use crate::util::{label, resolve_task};

pub async fn delete_task(store: &impl TreeStore, command: DeleteCommand) -> Result<()> {
    let tree = store.load_tree().await?;
    let task = resolve_task(&tree, &command.id)?;
    let id = task.id.clone();
    let text = label(task).to_string();
    let subtasks = task.subtree_size() - 1;

    if !command.force {
        let prompt = if subtasks > 0 {
            format!("Delete task '{text}' and its {subtasks} subtask(s)?")
        } else {
            format!("Are you sure you want to delete task '{text}'?")
        };
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact();

        if !confirmed(answer)? {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    let tree = tree.delete_subtree(&id);
    store.save_tree(&tree).await?;

    if subtasks > 0 {
        println!("Deleted task '{text}' and {subtasks} subtask(s).");
    } else {
        println!("Deleted task '{text}'.");
    }
    Ok(())
}

/// A prompt that cannot be shown because there is no terminal counts as "no".
fn confirmed(answer: Result<bool, dialoguer::Error>) -> Result<bool> {
    match answer {
        Ok(answer) => Ok(answer),
        Err(dialoguer::Error::IO(err)) if err.kind() == ErrorKind::NotConnected => {
            debug!(error = %err, "no terminal to confirm on, cancelling");
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}
