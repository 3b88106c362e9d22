//! # Arbor Core Library
//!
//! Recurrence and date-relative visibility engine for a nested task tree.
//!
//! ## Features
//!
//! - **Nested Tasks**: An ordered forest of tasks, each owning its subtree
//! - **Recurrence Rules**: Daily, weekly (on chosen weekdays) and monthly rules
//!   with an interval, evaluated against an anchor date
//! - **Catch-up Advancement**: Completing a late occurrence skips every missed period
//! - **Temporal Views**: Past, today and future projections of the tree that keep
//!   ancestors of every match and report how many children were hidden
//! - **Pure Operations**: Every tree operation returns a new tree
//!
//! ## Core Modules
//!
//! - [`models`]: Task nodes, recurrence rules and update DTOs
//! - [`date`]: Calendar-day arithmetic
//! - [`recurrence`]: Occurrence predicate and advancer
//! - [`completion`]: Completion tracking and rule attach/detach
//! - [`filter`]: Past, today and future views
//! - [`tree`]: The task forest and its structural operations
//! - [`store`]: Persistence of the canonical tree
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use arbor_core::{
//!     date::parse_day,
//!     filter::filter_for_date,
//!     models::{Recurrence, TaskUpdate},
//!     store::{JsonFileStore, TreeStore},
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), arbor_core::error::CoreError> {
//!     let store = JsonFileStore::new("arbor.json");
//!     let tree = store.load_tree().await?;
//!     let today = parse_day("2024-05-01")?;
//!
//!     // Add a daily habit at the root
//!     let (tree, id) = tree.insert_root(today, today);
//!     let update = TaskUpdate {
//!         text: Some("Stretch".to_string()),
//!         recurrence: Some(Some(Recurrence::daily(1))),
//!         ..Default::default()
//!     };
//!     let tree = tree.update_task(&id, update, None, today);
//!
//!     // Finish today's occurrence; the schedule rolls on to tomorrow
//!     let tree = tree.toggle_completion(&id, true, today);
//!     store.save_tree(&tree).await?;
//!
//!     for (depth, node) in filter_for_date(&tree, today, today).flatten() {
//!         println!("{}{}", "  ".repeat(depth), node.text);
//!     }
//!     Ok(())
//! }
//! ```

pub mod completion;
pub mod date;
pub mod error;
pub mod filter;
pub mod models;
pub mod recurrence;
pub mod store;
pub mod tree;
