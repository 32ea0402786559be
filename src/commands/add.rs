use super::report;
use crate::db::students::run_blocking;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::student::Student;
use crate::msg_success;
use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Full name
    #[arg(required = true)]
    name: String,
    #[arg(short, long)]
    age: i32,
    #[arg(short, long)]
    department: String,
    #[arg(short, long)]
    email: Option<String>,
    #[arg(short, long)]
    phone: Option<String>,
    /// Grade point average on a 4.0 scale
    #[arg(short, long, default_value_t = 0.0)]
    gpa: f64,
    /// Enrollment date (YYYY-MM-DD), defaults to now
    #[arg(long)]
    enrolled: Option<NaiveDate>,
}

pub async fn cmd(args: AddArgs, config: &Config) -> Result<()> {
    let students = config.repository()?;

    let mut student = Student::new(&args.name, args.age, &args.department).with_gpa(args.gpa);
    student.email = args.email;
    student.phone_number = args.phone;
    if let Some(date) = args.enrolled {
        student.enrollment_date = date.and_time(chrono::NaiveTime::MIN);
    }

    match run_blocking(&students, move |s| s.add(&student)).await {
        Ok(id) => msg_success!(Message::StudentAdded(id)),
        Err(e) => return report(e),
    }

    Ok(())
}
