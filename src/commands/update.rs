use super::report;
use crate::db::students::run_blocking;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::student::Student;
use crate::{msg_error, msg_success};
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

/// Fields left out keep their stored value. Pass an empty string to clear
/// the email or phone number.
#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(required = true)]
    id: i64,
    #[arg(short, long)]
    name: Option<String>,
    #[arg(short, long)]
    age: Option<i32>,
    #[arg(short, long)]
    department: Option<String>,
    #[arg(short, long)]
    email: Option<String>,
    #[arg(short, long)]
    phone: Option<String>,
    #[arg(short, long)]
    gpa: Option<f64>,
    #[arg(long)]
    enrolled: Option<NaiveDate>,
    /// Set the active flag explicitly (true or false)
    #[arg(long)]
    active: Option<bool>,
}

impl UpdateArgs {
    fn apply(self, mut student: Student) -> Student {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(age) = self.age {
            student.age = age;
        }
        if let Some(department) = self.department {
            student.department = department;
        }
        if let Some(email) = self.email {
            student.email = Some(email);
        }
        if let Some(phone) = self.phone {
            student.phone_number = Some(phone);
        }
        if let Some(gpa) = self.gpa {
            student.gpa = gpa;
        }
        if let Some(date) = self.enrolled {
            student.enrollment_date = date.and_time(chrono::NaiveTime::MIN);
        }
        if let Some(active) = self.active {
            student.is_active = active;
        }
        student
    }
}

pub async fn cmd(args: UpdateArgs, config: &Config) -> Result<()> {
    let students = config.repository()?;
    let id = args.id;

    let current = match run_blocking(&students, move |s| s.get_by_id(id)).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            msg_error!(Message::StudentNotFound(id));
            return Ok(());
        }
        Err(e) => return report(e),
    };

    let changed = args.apply(current);
    match run_blocking(&students, move |s| s.update(&changed)).await {
        Ok(true) => msg_success!(Message::StudentUpdated(id)),
        Ok(false) => msg_error!(Message::StudentNotFound(id)),
        Err(e) => return report(e),
    }

    Ok(())
}
