use super::report;
use crate::db::students::run_blocking;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Include inactive students
    #[arg(short, long)]
    all: bool,
    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1)]
    page: i64,
    /// Students per page (defaults to the configured page size)
    #[arg(short, long)]
    size: Option<i64>,
}

pub async fn cmd(args: ListArgs, config: &Config) -> Result<()> {
    let students = config.repository()?;
    let include_inactive = args.all;
    let page = args.page;
    let page_size = args.size.unwrap_or(config.page_size);

    let result = run_blocking(&students, move |s| {
        let rows = s.list(include_inactive, page, page_size)?;
        let total = s.count(include_inactive)?;
        Ok((rows, total))
    })
    .await;

    let (rows, total) = match result {
        Ok(found) => found,
        Err(e) => return report(e),
    };

    if rows.is_empty() {
        msg_info!(Message::NoStudentsFound);
        return Ok(());
    }

    msg_print!(Message::StudentsHeader, true);
    View::students(&rows);
    let pages = if total == 0 { 0 } else { (total - 1) / page_size + 1 };
    msg_print!(Message::StudentsPage { page, pages, total });

    Ok(())
}
