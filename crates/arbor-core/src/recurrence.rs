//! Occurrence membership and catch-up advancement for recurring tasks.
//!
//! A rule is evaluated against an *anchor* date (the task's scheduled date).
//! Nothing before the anchor is ever an occurrence.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::date::{
    add_days, add_months, days_between, days_in_month, months_between, weekday_ordinal,
    weeks_between,
};
use crate::models::{Frequency, Recurrence, TaskNode};

/// Whether `date` is an occurrence of the task's recurrence rule.
///
/// False for one-shot tasks, for tasks without an anchor and for dates before
/// the anchor.
pub fn is_occurrence(task: &TaskNode, date: NaiveDate) -> bool {
    match (task.recurrence(), task.anchor()) {
        (Some(rule), Some(anchor)) => occurs_on(rule, anchor, date),
        _ => false,
    }
}

/// Rule-level predicate behind [`is_occurrence`].
pub fn occurs_on(rule: &Recurrence, anchor: NaiveDate, date: NaiveDate) -> bool {
    if date < anchor {
        return false;
    }
    let interval = i64::from(rule.interval());

    match rule.frequency() {
        Frequency::Daily => days_between(anchor, date) % interval == 0,
        Frequency::Weekly => {
            rule.days_of_week().contains(weekday_ordinal(date))
                && weeks_between(anchor, date) % interval == 0
        }
        Frequency::Monthly => {
            monthly_day_matches(anchor, date) && months_between(anchor, date) % interval == 0
        }
        Frequency::Unsupported => false,
    }
}

/// The anchor's day-of-month, or the last day of months too short to have it.
fn monthly_day_matches(anchor: NaiveDate, date: NaiveDate) -> bool {
    let wanted = anchor.day().min(days_in_month(date.year(), date.month()));
    date.day() == wanted
}

/// The date a recurring task becomes due next after an occurrence was
/// completed on `completed_on`.
///
/// Periods missed entirely are skipped, so the result is always strictly
/// after `completed_on`. `None` when the task has no rule or anchor, or the
/// rule's frequency is unsupported; callers leave the schedule unchanged then.
pub fn next_occurrence(task: &TaskNode, completed_on: NaiveDate) -> Option<NaiveDate> {
    let (Some(rule), Some(anchor)) = (task.recurrence(), task.anchor()) else {
        debug!(task = %task.id, "no recurrence rule or anchor, cannot advance");
        return None;
    };

    let next = next_after(rule, anchor, completed_on);
    if next.is_none() {
        debug!(task = %task.id, rule = %rule, "recurrence rule cannot be advanced");
    }
    next
}

/// First date strictly after `after` produced by stepping `rule` from `anchor`.
pub fn next_after(rule: &Recurrence, anchor: NaiveDate, after: NaiveDate) -> Option<NaiveDate> {
    let interval = i64::from(rule.interval());

    match rule.frequency() {
        Frequency::Daily => step_fixed(anchor, after, interval),
        // No weekday can ever match; fall back to whole periods.
        Frequency::Weekly if rule.days_of_week().is_empty() => {
            step_fixed(anchor, after, 7 * interval)
        }
        Frequency::Weekly => {
            let mut cursor = if anchor > after {
                anchor
            } else {
                add_days(after, 1)?
            };
            // A full week on the rule's cadence starts within `7 * interval` days.
            for _ in 0..7 * (interval + 1) {
                if occurs_on(rule, anchor, cursor) {
                    return Some(cursor);
                }
                cursor = add_days(cursor, 1)?;
            }
            None
        }
        Frequency::Monthly => {
            let mut months = if anchor > after {
                0
            } else {
                months_between(anchor, after) / interval * interval
            };
            // At most two candidates: the month of `after`, then the next period.
            loop {
                let candidate = add_months(anchor, u32::try_from(months).ok()?)?;
                if candidate > after {
                    return Some(candidate);
                }
                months += interval;
            }
        }
        Frequency::Unsupported => None,
    }
}

/// `anchor + k * step_days` for the smallest `k >= 0` landing after `after`.
fn step_fixed(anchor: NaiveDate, after: NaiveDate, step_days: i64) -> Option<NaiveDate> {
    if anchor > after {
        return Some(anchor);
    }
    let periods = days_between(anchor, after) / step_days + 1;
    add_days(anchor, periods * step_days)
}

/// The next `count` occurrences strictly after `after`.
///
/// Fewer are returned when the rule runs past the last representable date.
pub fn upcoming_occurrences(task: &TaskNode, after: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let (Some(rule), Some(anchor)) = (task.recurrence(), task.anchor()) else {
        return Vec::new();
    };

    // `count` is caller-controlled; grow as dates are found.
    let mut dates = Vec::new();
    let mut cursor = after;
    while dates.len() < count {
        match next_after(rule, anchor, cursor) {
            Some(next) => {
                dates.push(next);
                cursor = next;
            }
            None => break,
        }
    }
    dates
}
