use anyhow::{anyhow, Result};
use arbor_core::error::CoreError;
use arbor_core::models::{TaskId, TaskNode};
use arbor_core::tree::TaskTree;

/// Resolves a full id or a unique id prefix of at least two characters.
pub fn resolve_task_id(tree: &TaskTree, short_id: &str) -> Result<TaskId> {
    if short_id.len() < 2 {
        return Err(anyhow!(CoreError::InvalidInput(
            "Short ID must be at least 2 characters long.".to_string()
        )));
    }
    let exact = TaskId::from(short_id);
    if tree.contains(&exact) {
        return Ok(exact);
    }

    let tasks = tree.find_by_id_prefix(short_id);
    match tasks.as_slice() {
        [task] => Ok(task.id.clone()),
        [] => Err(anyhow!(CoreError::NotFound(format!(
            "No task found with ID prefix '{}'",
            short_id
        )))),
        _ => {
            let task_info: Vec<(String, String)> = tasks
                .iter()
                .map(|t| (t.id.to_string(), t.text.clone()))
                .collect();
            Err(anyhow!(CoreError::AmbiguousId(task_info)))
        }
    }
}

/// Resolves `short_id` and returns the matching node.
pub fn resolve_task<'a>(tree: &'a TaskTree, short_id: &str) -> Result<&'a TaskNode> {
    let id = resolve_task_id(tree, short_id)?;
    tree.find(&id)
        .ok_or_else(|| anyhow!(CoreError::NotFound(id.to_string())))
}

/// Label used in command output: the task text, or a placeholder for empty tasks.
pub fn label(task: &TaskNode) -> &str {
    if task.text.is_empty() {
        "(untitled)"
    } else {
        &task.text
    }
}
