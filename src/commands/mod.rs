pub mod add;
pub mod delete;
pub mod import;
pub mod init;
pub mod list;
pub mod migrations;
pub mod search;
pub mod stats;
pub mod update;

use crate::db::students::run_blocking;
use crate::libs::config::Config;
use crate::libs::error::RosterError;
use crate::libs::messages::{macros::enable_debug_mode, Message};
use crate::libs::view::View;
use crate::{msg_error, msg_print, msg_success};
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init,
    #[command(about = "Check that the database can be opened")]
    Check,
    #[command(about = "List students page by page")]
    List(list::ListArgs),
    #[command(about = "Show a single student", arg_required_else_help = true)]
    Show { id: i64 },
    #[command(about = "Add a student", arg_required_else_help = true)]
    Add(add::AddArgs),
    #[command(about = "Change fields of a student", arg_required_else_help = true)]
    Update(update::UpdateArgs),
    #[command(about = "Mark a student inactive", arg_required_else_help = true)]
    Deactivate { id: i64 },
    #[command(about = "Permanently delete a student", arg_required_else_help = true)]
    Delete(delete::DeleteArgs),
    #[command(about = "Search active students")]
    Search(search::SearchArgs),
    #[command(about = "Statistics over all students")]
    Stats,
    #[command(about = "Statistics per department over active students")]
    Departments,
    #[command(about = "Import students from a JSON file in one transaction", arg_required_else_help = true)]
    Import(import::ImportArgs),
    #[command(about = "Show the database schema version and migration history")]
    Migrations,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        let config = Config::load()?;
        init_logging(&config)?;

        match cli.command {
            Commands::Init => init::cmd(),
            Commands::Check => check(&config).await,
            Commands::List(args) => list::cmd(args, &config).await,
            Commands::Show { id } => show(id, &config).await,
            Commands::Add(args) => add::cmd(args, &config).await,
            Commands::Update(args) => update::cmd(args, &config).await,
            Commands::Deactivate { id } => deactivate(id, &config).await,
            Commands::Delete(args) => delete::cmd(args, &config).await,
            Commands::Search(args) => search::cmd(args, &config).await,
            Commands::Stats => stats::cmd(&config).await,
            Commands::Departments => stats::departments(&config).await,
            Commands::Import(args) => import::cmd(args, &config).await,
            Commands::Migrations => migrations::cmd(&config).await,
        }
    }
}

/// Installs a `tracing` subscriber when logging is enabled in config or via `RUST_LOG`.
fn init_logging(config: &Config) -> Result<()> {
    if !config.logging && std::env::var("RUST_LOG").is_err() {
        return Ok(());
    }
    enable_debug_mode();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("roster=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Prints the expected repository failures and passes everything else up.
pub(crate) fn report(err: RosterError) -> Result<()> {
    match &err {
        RosterError::InvalidArgument(reason) => {
            msg_error!(Message::StudentValidationFailed(reason.clone()));
            Ok(())
        }
        RosterError::Conflict(reason) => {
            msg_error!(reason);
            Ok(())
        }
        RosterError::Timeout => {
            msg_error!(Message::OperationTimedOut);
            Ok(())
        }
        _ => Err(err.into()),
    }
}

async fn check(config: &Config) -> Result<()> {
    let students = config.repository()?;
    let path = students.path().display().to_string();

    if run_blocking(&students, |s| Ok(s.check_connection())).await? {
        msg_success!(Message::ConnectionOk(path));
    } else {
        msg_error!(Message::ConnectionFailed(path));
    }
    Ok(())
}

async fn show(id: i64, config: &Config) -> Result<()> {
    let students = config.repository()?;

    match run_blocking(&students, move |s| s.get_by_id(id)).await {
        Ok(Some(student)) => {
            msg_print!(Message::StudentDetailsHeader(id), true);
            View::student(&student);
        }
        Ok(None) => msg_error!(Message::StudentNotFound(id)),
        Err(e) => return report(e),
    }
    Ok(())
}

async fn deactivate(id: i64, config: &Config) -> Result<()> {
    let students = config.repository()?;

    match run_blocking(&students, move |s| s.soft_delete(id)).await {
        Ok(true) => msg_success!(Message::StudentDeactivated(id)),
        Ok(false) => msg_error!(Message::StudentAlreadyInactive(id)),
        Err(e) => return report(e),
    }
    Ok(())
}
