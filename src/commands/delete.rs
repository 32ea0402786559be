use super::report;
use crate::db::students::run_blocking;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::{msg_error, msg_info, msg_success};
use anyhow::Result;
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[arg(required = true)]
    id: i64,
    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

pub async fn cmd(args: DeleteArgs, config: &Config) -> Result<()> {
    let students = config.repository()?;
    let id = args.id;

    let student = match run_blocking(&students, move |s| s.get_by_id(id)).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            msg_error!(Message::StudentNotFound(id));
            return Ok(());
        }
        Err(e) => return report(e),
    };

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::ConfirmDeleteStudent(student.name).to_string())
            .default(false)
            .interact()?;
        if !confirmed {
            msg_info!(Message::DeleteCancelled);
            return Ok(());
        }
    }

    match run_blocking(&students, move |s| s.delete(id)).await {
        Ok(true) => msg_success!(Message::StudentDeleted(id)),
        Ok(false) => msg_error!(Message::StudentNotFound(id)),
        Err(e) => return report(e),
    }

    Ok(())
}
