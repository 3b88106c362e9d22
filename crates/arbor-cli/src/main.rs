use anyhow::{anyhow, Result};
use arbor_core::error::CoreError;
use arbor_core::store::JsonFileStore;
use chrono::{Local, NaiveDate};
use clap::Parser;
use owo_colors::{OwoColorize, Style};
use std::io::IsTerminal;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod parser;
mod util;
mod views;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    if let Err(e) = run(cli).await {
        handle_error(e);
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> Result<()> {
    init_tracing(cli.verbose, cli.quiet)?;

    let config = config::Config::load();
    let today = match cli.today.as_deref() {
        Some(raw) => parser::parse_date(raw, Local::now().date_naive())?,
        None => Local::now().date_naive(),
    };
    let tree_path = cli.file.unwrap_or_else(|| config.tree_path.clone());
    info!(file = %tree_path.display(), %today, "starting arbor");

    let store = JsonFileStore::new(tree_path);
    dispatch(&store, cli.command, &config, today).await
}

async fn dispatch(
    store: &JsonFileStore,
    command: cli::Commands,
    config: &config::Config,
    today: NaiveDate,
) -> Result<()> {
    match command {
        cli::Commands::Add(command) => commands::add::add_task(store, command, today).await,
        cli::Commands::List(command) => {
            commands::list::list_tasks(store, command, config, today).await
        }
        cli::Commands::Do(command) => commands::r#do::do_task(store, command, today).await,
        cli::Commands::Undo(command) => commands::r#do::undo_task(store, command, today).await,
        cli::Commands::Edit(command) => commands::edit::edit_task(store, command, today).await,
        cli::Commands::Move(command) => commands::r#move::move_task(store, command).await,
        cli::Commands::Delete(command) => commands::delete::delete_task(store, command).await,
        cli::Commands::Recur(command) => {
            commands::recurrence::recurrence_command(store, command, config, today).await
        }
        cli::Commands::Field(command) => {
            commands::field::field_command(store, command, today).await
        }
    }
}

/// Log level from `-v`/`-q` counts; `RUST_LOG` wins when set.
fn init_tracing(verbose: u8, quiet: u8) -> Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }
    Ok(())
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    if let Some(core_error) = err.downcast_ref::<CoreError>() {
        match core_error {
            CoreError::NotFound(s) => {
                eprintln!("{} {}", "Error:".style(error_style), s);
            }
            CoreError::AmbiguousId(tasks) => {
                eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
                eprintln!("Did you mean one of these?");
                for (id, text) in tasks {
                    eprintln!("  {} ({})", id.yellow(), text);
                }
            }
            CoreError::InvalidInput(s) => {
                eprintln!("{} Invalid input: {}", "Error:".style(error_style), s);
            }
            CoreError::CircularMove(task, target) => {
                eprintln!(
                    "{} Cannot move '{}' under '{}': it would become its own ancestor",
                    "Error:".style(error_style),
                    task.yellow(),
                    target.yellow()
                );
            }
            _ => eprintln!("{} {:#}", "Error:".style(error_style), err),
        }
    } else {
        eprintln!("{} {:#}", "Error:".style(error_style), err);
    }
}
