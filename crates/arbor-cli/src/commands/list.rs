use anyhow::Result;
use arbor_core::date::{format_day, DateView};
use arbor_core::filter::filter_for_date;
use arbor_core::models::SHORT_ID_LEN;
use arbor_core::store::TreeStore;
use chrono::NaiveDate;
use owo_colors::OwoColorize;

use crate::cli::ListCommand;
use crate::config::Config;
use crate::parser::parse_date;
use crate::views::table::{display_tasks, ViewTask};

pub async fn list_tasks(
    store: &impl TreeStore,
    command: ListCommand,
    config: &Config,
    today: NaiveDate,
) -> Result<()> {
    let tree = store.load_tree().await?;
    let short_ids = tree.short_ids(SHORT_ID_LEN);

    if command.all {
        println!("{}", "All tasks".bold());
        display_tasks(&ViewTask::from_tree(&tree, today, &short_ids), today, false);
        return Ok(());
    }

    let date = command
        .date
        .as_deref()
        .map(|d| parse_date(d, today))
        .transpose()?
        .unwrap_or(today);

    let heading = match DateView::classify(date, today) {
        DateView::Past => format!("Finished on {}", format_day(date)),
        DateView::Today => format!("Today, {}", format_day(date)),
        DateView::Future => format!("Due on {}", format_day(date)),
    };
    println!("{}", heading.bold());

    let visible = filter_for_date(&tree, date, today);
    display_tasks(
        &ViewTask::from_tree(&visible, date, &short_ids),
        today,
        config.list.show_hidden_counts,
    );

    Ok(())
}
