pub mod add;
pub mod delete;
pub mod r#do;
pub mod edit;
pub mod field;
pub mod list;
pub mod r#move;
pub mod recurrence;
