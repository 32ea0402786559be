use super::report;
use crate::db::students::run_blocking;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::{msg_info, msg_print};
use anyhow::Result;

pub async fn cmd(config: &Config) -> Result<()> {
    let students = config.repository()?;

    match run_blocking(&students, |s| s.statistics()).await {
        Ok(stats) => {
            msg_print!(Message::StatisticsHeader, true);
            View::statistics(&stats);
        }
        Err(e) => return report(e),
    }

    Ok(())
}

pub async fn departments(config: &Config) -> Result<()> {
    let students = config.repository()?;

    let departments = match run_blocking(&students, |s| s.department_statistics()).await {
        Ok(departments) => departments,
        Err(e) => return report(e),
    };

    if departments.is_empty() {
        msg_info!(Message::NoDepartmentStatistics);
        return Ok(());
    }

    msg_print!(Message::DepartmentStatisticsHeader, true);
    View::department_statistics(&departments);

    Ok(())
}
