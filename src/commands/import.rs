use super::report;
use crate::db::students::run_blocking;
use crate::libs::config::Config;
use crate::libs::error::RosterError;
use crate::libs::messages::Message;
use crate::libs::student::Student;
use crate::{msg_error, msg_info, msg_success};
use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};

/// The file holds a JSON array of students. `name`, `age` and `department`
/// are required; every other field falls back to its default.
#[derive(Debug, Args)]
pub struct ImportArgs {
    #[arg(required = true)]
    file: PathBuf,
}

pub fn read_students(path: &Path) -> Result<Vec<Student>> {
    let content = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
    let students: Vec<Student> = serde_json::from_str(&content).with_context(|| format!("{} is not a JSON array of students", path.display()))?;
    Ok(students)
}

pub async fn cmd(args: ImportArgs, config: &Config) -> Result<()> {
    msg_info!(Message::ImportReading(args.file.display().to_string()));
    let records = read_students(&args.file)?;
    if records.is_empty() {
        msg_info!(Message::ImportEmpty);
        return Ok(());
    }

    let students = config.repository()?;
    match run_blocking(&students, move |s| s.bulk_insert(&records)).await {
        Ok(count) => msg_success!(Message::ImportCompleted(count)),
        Err(RosterError::BulkInsert { inserted, source }) => {
            msg_error!(Message::ImportRolledBack(inserted));
            return report(*source);
        }
        Err(e) => return report(e),
    }

    Ok(())
}
