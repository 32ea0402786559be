use super::report;
use crate::db::students::run_blocking;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::student::StudentFilter;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Text to look for in name or department
    #[arg(short, long)]
    term: Option<String>,
    /// Exact department name
    #[arg(short, long)]
    department: Option<String>,
    #[arg(long)]
    min_age: Option<i32>,
    #[arg(long)]
    max_age: Option<i32>,
    #[arg(long)]
    min_gpa: Option<f64>,
}

impl From<SearchArgs> for StudentFilter {
    fn from(args: SearchArgs) -> Self {
        StudentFilter {
            term: args.term,
            department: args.department,
            min_age: args.min_age,
            max_age: args.max_age,
            min_gpa: args.min_gpa,
        }
    }
}

pub async fn cmd(args: SearchArgs, config: &Config) -> Result<()> {
    let students = config.repository()?;
    let filter = StudentFilter::from(args);

    let found = match run_blocking(&students, move |s| s.search(&filter)).await {
        Ok(found) => found,
        Err(e) => return report(e),
    };

    if found.is_empty() {
        msg_info!(Message::NoStudentsFound);
        return Ok(());
    }

    msg_print!(Message::SearchResultsHeader(found.len()), true);
    View::students(&found);

    Ok(())
}
