use arbor_core::models::Frequency;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Nested tasks with recurring schedules and date-relative views
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Task tree file (overrides `tree_path` from arbor.toml)
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,

    /// Reference date used as "today" (defaults to the local date)
    #[arg(long, global = true)]
    pub today: Option<String>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Less log output (-q warn, -qq error)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a new task
    Add(AddCommand),
    /// Show the tasks relevant to a date
    List(ListCommand),
    /// Mark a task as completed for a date
    Do(DoCommand),
    /// Mark a task as not completed for a date
    Undo(DoCommand),
    /// Edit a task
    Edit(EditCommand),
    /// Move a task under another parent or to the top level
    Move(MoveCommand),
    /// Delete a task and all of its subtasks
    Delete(DeleteCommand),
    /// Manage recurrence rules
    Recur(RecurrenceCommand),
    /// Manage custom fields
    Field(FieldCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// The text of the task
    pub text: String,
    /// Add as the last subtask of this task
    #[arg(short, long)]
    pub parent: Option<String>,
    /// The selected date; a future date becomes the task's schedule
    #[arg(short, long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Date to show (e.g. '2025-08-20', 'tomorrow'); defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
    /// Show the whole tree without date filtering
    #[arg(short, long, conflicts_with = "date")]
    pub all: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DoCommand {
    /// The ID of the task
    pub id: String,
    /// The date the completion applies to; defaults to today
    #[arg(short, long)]
    pub date: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the task to edit
    pub id: String,

    #[arg(long)]
    pub text: Option<String>,

    #[arg(long)]
    pub schedule: Option<String>,
    #[arg(long, conflicts_with = "schedule")]
    pub unschedule: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct MoveCommand {
    /// The ID of the task to move
    pub id: String,
    /// The new parent
    #[arg(long, conflicts_with = "root", required_unless_present = "root")]
    pub parent: Option<String>,
    /// Move to the top level
    #[arg(long)]
    pub root: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the task to delete
    pub id: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurrenceCommand {
    #[command(subcommand)]
    pub command: RecurrenceSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum RecurrenceSubcommand {
    /// Make a task repeat, or replace its rule
    Set(RecurrenceSetCommand),
    /// Stop a task from repeating
    Clear(RecurrenceClearCommand),
    /// Show the next occurrences of a recurring task
    Preview(RecurrencePreviewCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct RecurrenceSetCommand {
    /// The ID of the task
    pub id: String,
    /// How often the task repeats
    #[arg(long, value_enum)]
    pub every: RecurrenceFrequency,
    /// Repeat every N days, weeks or months
    #[arg(long, default_value_t = 1)]
    pub interval: i64,
    /// Days of week for weekly rules (mon,tue,wed,thu,fri,sat,sun)
    #[arg(long)]
    pub on: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurrenceClearCommand {
    /// The ID of the task
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct RecurrencePreviewCommand {
    /// The ID of the task
    pub id: String,
    /// Number of occurrences to show
    #[arg(long, short)]
    pub count: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceFrequency {
    /// Every N days
    Daily,
    /// On chosen weekdays every N weeks
    Weekly,
    /// On the same day of the month every N months
    Monthly,
}

impl From<RecurrenceFrequency> for Frequency {
    fn from(value: RecurrenceFrequency) -> Self {
        match value {
            RecurrenceFrequency::Daily => Frequency::Daily,
            RecurrenceFrequency::Weekly => Frequency::Weekly,
            RecurrenceFrequency::Monthly => Frequency::Monthly,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct FieldCommand {
    #[command(subcommand)]
    pub command: FieldSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum FieldSubcommand {
    /// Set a field, replacing any existing value
    Set(FieldSetCommand),
    /// Remove a field
    Remove(FieldRemoveCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct FieldSetCommand {
    /// The ID of the task
    pub id: String,
    pub key: String,
    pub value: String,
}

#[derive(Parser, Debug, Clone)]
pub struct FieldRemoveCommand {
    /// The ID of the task
    pub id: String,
    pub key: String,
}
