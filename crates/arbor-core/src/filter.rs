//! Date-relative projections of a task tree.
//!
//! Each filter returns a new tree holding the nodes relevant to a date plus
//! every ancestor of such a node, so nested matches stay reachable from a
//! root. Surviving nodes are annotated with their child count in the
//! canonical tree (`original_child_count`), letting views tell "no children"
//! apart from "children all filtered out". Filtering an already filtered tree
//! keeps the existing annotation, so each filter is idempotent.

use chrono::NaiveDate;
use tracing::trace;

use crate::date::DateView;
use crate::models::{TaskKind, TaskNode};
use crate::recurrence::is_occurrence;
use crate::tree::TaskTree;

/// What was finished on a past `date`.
///
/// A node survives when it was completed for `date` (one-shot completion date,
/// or a completed occurrence of a recurring task), or has a surviving descendant.
pub fn filter_past(tree: &TaskTree, date: NaiveDate) -> TaskTree {
    prune_tree(tree, &|node: &TaskNode| node.is_completed_on(date))
}

/// What is due on a future `date`.
///
/// A node survives when it is scheduled on `date`, when `date` is one of its
/// occurrences, or when it has a surviving descendant. Unscheduled one-shot
/// descendants of a matching node inherit its date and survive with it.
pub fn filter_future(tree: &TaskTree, date: NaiveDate) -> TaskTree {
    let roots = tree
        .roots()
        .iter()
        .filter_map(|node| future_node(node, date, false))
        .collect();
    TaskTree::from_roots(roots)
}

fn future_node(node: &TaskNode, date: NaiveDate, inherited: bool) -> Option<TaskNode> {
    let matched = node.scheduled_date == Some(date) || is_occurrence(node, date);
    let inherits = inherited && node.scheduled_date.is_none() && !node.is_recurring();
    let keep = matched || inherits;

    let children: Vec<TaskNode> = node
        .children
        .iter()
        .filter_map(|child| future_node(child, date, keep))
        .collect();

    (keep || !children.is_empty()).then(|| annotated(node, children))
}

/// What can be acted on `today`, plus what was just finished today.
///
/// A node is actionable when it is relevant today (unscheduled, due on or
/// before today, or occurring today) and not already completed. A node
/// survives when actionable, when completed today, or when it has a
/// surviving descendant.
pub fn filter_today(tree: &TaskTree, today: NaiveDate) -> TaskTree {
    prune_tree(tree, &|node: &TaskNode| {
        is_actionable(node, today) || node.is_completed_on(today)
    })
}

/// Whether `node` still needs doing on `today`.
pub fn is_actionable(node: &TaskNode, today: NaiveDate) -> bool {
    let due = match &node.kind {
        TaskKind::Recurring { .. } => node.anchor(),
        TaskKind::OneShot { .. } => node.scheduled_date,
    };
    let relevant = match due {
        None => true,
        Some(due) => due <= today || is_occurrence(node, today),
    };
    let completed = match &node.kind {
        TaskKind::OneShot { is_completed, .. } => *is_completed,
        TaskKind::Recurring {
            completed_occurrences,
            ..
        } => completed_occurrences.contains(&today),
    };
    relevant && !completed
}

/// Runs the filter matching where `date` sits relative to `today`.
#[tracing::instrument(level = "trace", skip(tree))]
pub fn filter_for_date(tree: &TaskTree, date: NaiveDate, today: NaiveDate) -> TaskTree {
    let view = DateView::classify(date, today);
    let filtered = match view {
        DateView::Past => filter_past(tree, date),
        DateView::Today => filter_today(tree, today),
        DateView::Future => filter_future(tree, date),
    };
    trace!(%view, total = tree.len(), visible = filtered.len(), "filtered task tree");
    filtered
}

/// Children a view has hidden from `node`.
pub fn hidden_children(node: &TaskNode) -> usize {
    node.original_child_count
        .map_or(0, |count| count.saturating_sub(node.children.len()))
}

fn prune_tree<F>(tree: &TaskTree, keep: &F) -> TaskTree
where
    F: Fn(&TaskNode) -> bool,
{
    let roots = tree
        .roots()
        .iter()
        .filter_map(|node| prune_node(node, keep))
        .collect();
    TaskTree::from_roots(roots)
}

fn prune_node<F>(node: &TaskNode, keep: &F) -> Option<TaskNode>
where
    F: Fn(&TaskNode) -> bool,
{
    let children: Vec<TaskNode> = node
        .children
        .iter()
        .filter_map(|child| prune_node(child, keep))
        .collect();

    (keep(node) || !children.is_empty()).then(|| annotated(node, children))
}

/// Copy of `node` without its canonical children, carrying `children` instead.
fn annotated(node: &TaskNode, children: Vec<TaskNode>) -> TaskNode {
    TaskNode {
        id: node.id.clone(),
        text: node.text.clone(),
        scheduled_date: node.scheduled_date,
        kind: node.kind.clone(),
        fields: node.fields.clone(),
        original_child_count: Some(node.original_child_count.unwrap_or(node.children.len())),
        children,
    }
}
