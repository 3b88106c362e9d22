use arbor_core::date::format_day;
use arbor_core::filter::hidden_children;
use arbor_core::models::{TaskId, TaskNode};
use arbor_core::tree::TaskTree;
use chrono::{Duration, NaiveDate};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use std::collections::HashMap;

use crate::util::label;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewStatus {
    Pending,
    Completed,
}

#[derive(Debug, Clone)]
pub struct ViewTask {
    pub id: TaskId,
    pub short_id: String,
    pub text: String,
    pub depth: usize,
    pub status: ViewStatus,
    pub scheduled_date: Option<NaiveDate>,
    pub rule: Option<String>,
    pub hidden_children: usize,
}

impl ViewTask {
    /// Flattens `tree` for display. Status is evaluated for `date`; ids are
    /// shortened with `short_ids`, computed over the whole loaded tree.
    pub fn from_tree(
        tree: &TaskTree,
        date: NaiveDate,
        short_ids: &HashMap<TaskId, String>,
    ) -> Vec<ViewTask> {
        tree.flatten()
            .into_iter()
            .map(|(depth, node)| ViewTask::from_node(node, depth, date, short_ids))
            .collect()
    }

    fn from_node(
        node: &TaskNode,
        depth: usize,
        date: NaiveDate,
        short_ids: &HashMap<TaskId, String>,
    ) -> ViewTask {
        let done = node.is_completed() || node.is_completed_on(date);
        ViewTask {
            id: node.id.clone(),
            short_id: short_ids
                .get(&node.id)
                .cloned()
                .unwrap_or_else(|| node.id.to_string()),
            text: label(node).to_string(),
            depth,
            status: if done {
                ViewStatus::Completed
            } else {
                ViewStatus::Pending
            },
            scheduled_date: node.scheduled_date,
            rule: node.recurrence().map(ToString::to_string),
            hidden_children: hidden_children(node),
        }
    }
}

/// "2024-06-01 (in 3 days)", relative to `today`.
pub fn describe_day(day: NaiveDate, today: NaiveDate) -> String {
    let relative = match (day - today).num_days() {
        0 => "today".to_string(),
        days => Duration::days(days).humanize(),
    };
    format!("{} ({})", format_day(day), relative)
}

pub fn display_tasks(tasks: &[ViewTask], today: NaiveDate, show_hidden_counts: bool) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Task", "Scheduled", "Repeats", "Status"]);

    for task in tasks {
        let mut row = Row::new();
        row.add_cell(Cell::new(&task.short_id));

        let mut display_text = "  ".repeat(task.depth);
        if task.rule.is_some() {
            display_text.push('↻');
            display_text.push(' ');
        }
        display_text.push_str(&task.text);
        if show_hidden_counts && task.hidden_children > 0 {
            display_text.push_str(&format!(" (+{} hidden)", task.hidden_children));
        }

        let text_cell = match task.status {
            ViewStatus::Completed => Cell::new(display_text)
                .add_attribute(Attribute::CrossedOut)
                .fg(Color::DarkGrey),
            ViewStatus::Pending => Cell::new(display_text),
        };
        row.add_cell(text_cell);

        let scheduled_cell = match task.scheduled_date {
            Some(day) => {
                let text = describe_day(day, today);
                match (task.status, day.cmp(&today)) {
                    (ViewStatus::Pending, std::cmp::Ordering::Less) => Cell::new(text).fg(Color::Red),
                    (ViewStatus::Pending, std::cmp::Ordering::Equal) => {
                        Cell::new(text).fg(Color::Yellow)
                    }
                    _ => Cell::new(text),
                }
            }
            None => Cell::new("None"),
        };
        row.add_cell(scheduled_cell);

        row.add_cell(Cell::new(task.rule.as_deref().unwrap_or("None")));

        let status_cell = match task.status {
            ViewStatus::Completed => Cell::new("Completed").fg(Color::Green),
            ViewStatus::Pending => Cell::new("Pending"),
        };
        row.add_cell(status_cell);
        table.add_row(row);
    }

    println!("{table}");
}
