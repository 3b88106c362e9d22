use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::skip_serializing_none;
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque, stable identifier of a task node.
///
/// New ids are random UUIDv4 strings, so short prefixes rarely collide; ids
/// loaded from an existing document are kept verbatim (numeric ids are
/// accepted and stringified).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

}

/// Fewest characters of an id shown to users; see [`crate::tree::TaskTree::short_ids`].
pub const SHORT_ID_LEN: usize = 7;

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => TaskId(text),
            RawId::Number(number) => TaskId(number.to_string()),
        })
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Recurrence rules
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    /// Any frequency this engine does not schedule. Never occurs, never advances.
    #[serde(other)]
    Unsupported,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Unsupported => write!(f, "unsupported"),
        }
    }
}

const WEEKDAY_NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];

/// Set of weekday ordinals, Sunday = 0 through Saturday = 6.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Ordinals outside `0..=6` are ignored.
    pub fn insert(&mut self, ordinal: u8) {
        if ordinal < 7 {
            self.0 |= 1 << ordinal;
        }
    }

    pub fn contains(&self, ordinal: u8) -> bool {
        ordinal < 7 && self.0 & (1 << ordinal) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0u8..7).filter(move |ordinal| self.contains(*ordinal))
    }
}

impl FromIterator<u8> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = WeekdaySet::empty();
        for ordinal in iter {
            set.insert(ordinal);
        }
        set
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid weekday: {0}")]
pub struct ParseWeekdayError(String);

/// Parses a comma-separated list such as `mon,wed` or `1,3`.
impl FromStr for WeekdaySet {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = WeekdaySet::empty();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let lower = part.to_lowercase();
            let ordinal = match lower.parse::<u8>() {
                Ok(n) if n < 7 => n,
                Ok(_) => return Err(ParseWeekdayError(part.to_string())),
                Err(_) => WEEKDAY_NAMES
                    .iter()
                    .position(|name| lower.starts_with(name))
                    .ok_or_else(|| ParseWeekdayError(part.to_string()))? as u8,
            };
            set.insert(ordinal);
        }
        Ok(set)
    }
}

impl std::fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(|o| WEEKDAY_NAMES[o as usize]).collect();
        f.write_str(&names.join(","))
    }
}

/// A recurrence rule. `interval` is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recurrence {
    frequency: Frequency,
    interval: u32,
    days_of_week: WeekdaySet,
}

impl Recurrence {
    /// Builds a rule, clamping `interval` below 1 up to 1. `days_of_week` is
    /// only kept for weekly rules.
    pub fn new(frequency: Frequency, interval: i64, days_of_week: WeekdaySet) -> Self {
        let interval = interval.clamp(1, i64::from(u32::MAX)) as u32;
        let days_of_week = if frequency == Frequency::Weekly {
            days_of_week
        } else {
            WeekdaySet::empty()
        };
        Self {
            frequency,
            interval,
            days_of_week,
        }
    }

    pub fn daily(interval: i64) -> Self {
        Self::new(Frequency::Daily, interval, WeekdaySet::empty())
    }

    pub fn weekly(interval: i64, days_of_week: WeekdaySet) -> Self {
        Self::new(Frequency::Weekly, interval, days_of_week)
    }

    pub fn monthly(interval: i64) -> Self {
        Self::new(Frequency::Monthly, interval, WeekdaySet::empty())
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }

    pub fn days_of_week(&self) -> WeekdaySet {
        self.days_of_week
    }
}

impl std::fmt::Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unit = match self.frequency {
            Frequency::Daily => "day",
            Frequency::Weekly => "week",
            Frequency::Monthly => "month",
            Frequency::Unsupported => return write!(f, "unsupported"),
        };
        if self.interval == 1 {
            write!(f, "every {unit}")?;
        } else {
            write!(f, "every {} {unit}s", self.interval)?;
        }
        if self.frequency == Frequency::Weekly && !self.days_of_week.is_empty() {
            write!(f, " on {}", self.days_of_week)?;
        }
        Ok(())
    }
}

#[skip_serializing_none]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecurrenceRecord {
    frequency: Frequency,
    #[serde(default = "default_interval")]
    interval: i64,
    #[serde(default)]
    days_of_week: Option<Vec<i64>>,
}

fn default_interval() -> i64 {
    1
}

impl Serialize for Recurrence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        RecurrenceRecord {
            frequency: self.frequency,
            interval: i64::from(self.interval),
            days_of_week: (self.frequency == Frequency::Weekly)
                .then(|| self.days_of_week.iter().map(i64::from).collect()),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Recurrence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = RecurrenceRecord::deserialize(deserializer)?;
        let days = record
            .days_of_week
            .unwrap_or_default()
            .into_iter()
            .filter_map(|d| u8::try_from(d).ok())
            .collect();
        Ok(Recurrence::new(record.frequency, record.interval, days))
    }
}

// ============================================================================
// Task nodes
// ============================================================================

/// Free-form key/value pair attached to a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: String,
}

/// Completion bookkeeping, which differs between one-shot and recurring tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    OneShot {
        is_completed: bool,
        completion_date: Option<NaiveDate>,
    },
    Recurring {
        rule: Recurrence,
        /// Captured when the rule was attached; anchor fallback when the task
        /// has no scheduled date.
        start_date: Option<NaiveDate>,
        completed_occurrences: BTreeSet<NaiveDate>,
    },
}

impl Default for TaskKind {
    fn default() -> Self {
        TaskKind::OneShot {
            is_completed: false,
            completion_date: None,
        }
    }
}

/// A task and, recursively, the subtree it owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskNode {
    pub id: TaskId,
    pub text: String,
    pub children: Vec<TaskNode>,
    /// For recurring tasks, the next due date and anchor of the rule.
    pub scheduled_date: Option<NaiveDate>,
    pub kind: TaskKind,
    pub fields: Vec<Field>,
    /// Child count in the canonical tree; only set on filtered projections.
    pub original_child_count: Option<usize>,
}

impl TaskNode {
    /// A new, empty task with a fresh id.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(TaskId::generate(), text)
    }

    pub fn with_id(id: impl Into<TaskId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            children: Vec::new(),
            scheduled_date: None,
            kind: TaskKind::default(),
            fields: Vec::new(),
            original_child_count: None,
        }
    }

    pub fn scheduled_on(mut self, date: NaiveDate) -> Self {
        self.scheduled_date = Some(date);
        self
    }

    pub fn with_child(mut self, child: TaskNode) -> Self {
        self.children.push(child);
        self
    }

    /// Turns the node into a recurring task with no completed occurrences.
    pub fn with_recurrence(mut self, rule: Recurrence) -> Self {
        self.kind = TaskKind::Recurring {
            rule,
            start_date: self.scheduled_date,
            completed_occurrences: BTreeSet::new(),
        };
        self
    }

    pub fn completed_on(mut self, date: NaiveDate) -> Self {
        match &mut self.kind {
            TaskKind::OneShot {
                is_completed,
                completion_date,
            } => {
                *is_completed = true;
                *completion_date = Some(date);
            }
            TaskKind::Recurring {
                completed_occurrences,
                ..
            } => {
                completed_occurrences.insert(date);
            }
        }
        self
    }

    pub fn is_recurring(&self) -> bool {
        matches!(self.kind, TaskKind::Recurring { .. })
    }

    pub fn recurrence(&self) -> Option<&Recurrence> {
        match &self.kind {
            TaskKind::Recurring { rule, .. } => Some(rule),
            TaskKind::OneShot { .. } => None,
        }
    }

    /// Reference date of the recurrence rule: the scheduled date, else the
    /// date captured when the rule was attached. `None` for one-shot tasks.
    pub fn anchor(&self) -> Option<NaiveDate> {
        match &self.kind {
            TaskKind::Recurring { start_date, .. } => self.scheduled_date.or(*start_date),
            TaskKind::OneShot { .. } => None,
        }
    }

    pub fn completed_occurrences(&self) -> Option<&BTreeSet<NaiveDate>> {
        match &self.kind {
            TaskKind::Recurring {
                completed_occurrences,
                ..
            } => Some(completed_occurrences),
            TaskKind::OneShot { .. } => None,
        }
    }

    /// One-shot: done at all. Recurring: always false, see [`Self::is_completed_on`].
    pub fn is_completed(&self) -> bool {
        matches!(
            self.kind,
            TaskKind::OneShot {
                is_completed: true,
                ..
            }
        )
    }

    /// Whether the task was completed for `date`, through whichever mechanism
    /// its kind uses.
    pub fn is_completed_on(&self, date: NaiveDate) -> bool {
        match &self.kind {
            TaskKind::OneShot {
                is_completed,
                completion_date,
            } => *is_completed && *completion_date == Some(date),
            TaskKind::Recurring {
                completed_occurrences,
                ..
            } => completed_occurrences.contains(&date),
        }
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    /// Replaces the value of an existing key in place, or appends a new pair.
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|f| f.key == key) {
            Some(field) => field.value = value,
            None => self.fields.push(Field { key, value }),
        }
    }

    /// Returns whether a field was removed.
    pub fn remove_field(&mut self, key: &str) -> bool {
        let before = self.fields.len();
        self.fields.retain(|f| f.key != key);
        self.fields.len() != before
    }

    /// Number of nodes in this subtree, the node itself included.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(TaskNode::subtree_size).sum::<usize>()
    }
}

// Flat wire shape of a task node, with camelCase keys.

#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecordRef<'a> {
    id: &'a TaskId,
    text: &'a str,
    children: &'a [TaskNode],
    is_completed: bool,
    completion_date: Option<NaiveDate>,
    scheduled_date: Option<NaiveDate>,
    recurrence: Option<&'a Recurrence>,
    recurrence_start_date: Option<NaiveDate>,
    completed_occurrences: Option<&'a BTreeSet<NaiveDate>>,
    fields: &'a [Field],
    original_child_count: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskRecord {
    id: TaskId,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    children: Option<Vec<TaskNode>>,
    #[serde(default)]
    is_completed: Option<bool>,
    #[serde(default)]
    completion_date: Option<NaiveDate>,
    #[serde(default)]
    scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    recurrence: Option<Recurrence>,
    #[serde(default)]
    recurrence_start_date: Option<NaiveDate>,
    #[serde(default)]
    completed_occurrences: Option<BTreeSet<NaiveDate>>,
    #[serde(default)]
    fields: Option<Vec<Field>>,
    #[serde(default)]
    original_child_count: Option<usize>,
}

impl Serialize for TaskNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let (is_completed, completion_date, recurrence, start_date, occurrences) = match &self.kind {
            TaskKind::OneShot {
                is_completed,
                completion_date,
            } => (*is_completed, *completion_date, None, None, None),
            TaskKind::Recurring {
                rule,
                start_date,
                completed_occurrences,
            } => (false, None, Some(rule), *start_date, Some(completed_occurrences)),
        };

        TaskRecordRef {
            id: &self.id,
            text: &self.text,
            children: &self.children,
            is_completed,
            completion_date,
            scheduled_date: self.scheduled_date,
            recurrence,
            recurrence_start_date: start_date,
            completed_occurrences: occurrences,
            fields: &self.fields,
            original_child_count: self.original_child_count,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TaskNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = TaskRecord::deserialize(deserializer)?;
        // Completion fields of the kind the node is not are stale and dropped.
        let kind = match record.recurrence {
            Some(rule) => TaskKind::Recurring {
                rule,
                start_date: record.recurrence_start_date,
                completed_occurrences: record.completed_occurrences.unwrap_or_default(),
            },
            None => TaskKind::OneShot {
                is_completed: record.is_completed.unwrap_or(false),
                completion_date: record.completion_date,
            },
        };

        Ok(TaskNode {
            id: record.id,
            text: record.text.unwrap_or_default(),
            children: record.children.unwrap_or_default(),
            scheduled_date: record.scheduled_date,
            kind,
            fields: record.fields.unwrap_or_default(),
            original_child_count: record.original_child_count,
        })
    }
}

// ============================================================================
// Partial updates
// ============================================================================

/// Partial update produced by the completion tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionUpdate {
    OneShot {
        is_completed: bool,
        completion_date: Option<NaiveDate>,
    },
    Recurring {
        completed_occurrences: BTreeSet<NaiveDate>,
    },
}

/// Changes to apply to a single node. `None` leaves the attribute untouched;
/// for the `Option<Option<_>>` fields, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub text: Option<String>,
    pub scheduled_date: Option<Option<NaiveDate>>,
    /// `Some(Some(rule))` attaches or replaces the rule, `Some(None)` detaches it.
    pub recurrence: Option<Option<Recurrence>>,
    pub completion: Option<CompletionUpdate>,
    pub set_fields: Vec<Field>,
    pub remove_fields: Vec<String>,
}
