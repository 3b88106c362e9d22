//! Completion bookkeeping for one-shot and recurring tasks.
//!
//! Nothing here advances a recurring task's schedule; see
//! [`crate::recurrence::next_occurrence`] and
//! [`crate::tree::TaskTree::toggle_completion`] for the composed policy.

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::{CompletionUpdate, Recurrence, TaskKind, TaskNode};

/// Partial update recording that `task` was marked complete (or incomplete)
/// for `for_date`.
///
/// Recurring tasks add or remove `for_date` in their completed occurrences.
/// One-shot tasks set or clear their completed flag and completion date.
pub fn apply_completion(task: &TaskNode, completed: bool, for_date: NaiveDate) -> CompletionUpdate {
    match &task.kind {
        TaskKind::Recurring {
            completed_occurrences,
            ..
        } => {
            let mut occurrences = completed_occurrences.clone();
            if completed {
                occurrences.insert(for_date);
            } else {
                occurrences.remove(&for_date);
            }
            CompletionUpdate::Recurring {
                completed_occurrences: occurrences,
            }
        }
        TaskKind::OneShot { .. } => CompletionUpdate::OneShot {
            is_completed: completed,
            completion_date: completed.then_some(for_date),
        },
    }
}

/// Merges a completion update into a copy of `task`.
///
/// An update built for the other kind of task (the rule was attached or
/// detached in between) is stale and ignored.
pub fn merge_completion(task: &TaskNode, update: CompletionUpdate) -> TaskNode {
    let mut merged = task.clone();
    match (&mut merged.kind, update) {
        (
            TaskKind::OneShot {
                is_completed,
                completion_date,
            },
            CompletionUpdate::OneShot {
                is_completed: done,
                completion_date: date,
            },
        ) => {
            *is_completed = done;
            *completion_date = date;
        }
        (
            TaskKind::Recurring {
                completed_occurrences,
                ..
            },
            CompletionUpdate::Recurring {
                completed_occurrences: dates,
            },
        ) => *completed_occurrences = dates,
        _ => {}
    }
    merged
}

/// Attaches `rule` to `task`, or replaces the rule of an already recurring task.
///
/// A task becoming recurring captures its recurrence start date from its
/// scheduled date, else `for_date`, else `today`, and is scheduled on it when
/// it had no schedule. One-shot completion state is dropped.
pub fn attach_recurrence(
    task: &TaskNode,
    rule: Recurrence,
    for_date: Option<NaiveDate>,
    today: NaiveDate,
) -> TaskNode {
    let mut updated = task.clone();
    match &mut updated.kind {
        TaskKind::Recurring { rule: current, .. } => *current = rule,
        TaskKind::OneShot { .. } => {
            let start = task.scheduled_date.or(for_date).unwrap_or(today);
            updated.scheduled_date = Some(start);
            updated.kind = TaskKind::Recurring {
                rule,
                start_date: Some(start),
                completed_occurrences: BTreeSet::new(),
            };
        }
    }
    updated
}

/// Turns `task` back into an incomplete one-shot task, keeping its schedule.
pub fn detach_recurrence(task: &TaskNode) -> TaskNode {
    let mut updated = task.clone();
    if updated.is_recurring() {
        updated.kind = TaskKind::default();
    }
    updated
}
