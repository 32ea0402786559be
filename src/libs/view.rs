use super::student::{DepartmentStatistics, Student, StudentStatistics};
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn students(students: &[Student]) {
        let mut table = Table::new();

        table.add_row(row!["ID", "NAME", "AGE", "GROUP", "DEPARTMENT", "EMAIL", "GPA", "GRADE", "ACTIVE"]);
        for student in students {
            table.add_row(row![
                student.id,
                student.name,
                student.age,
                student.age_group(),
                student.department,
                student.email.as_deref().unwrap_or("-"),
                format!("{:.2}", student.gpa),
                student.letter_grade(),
                if student.is_active { "yes" } else { "no" }
            ]);
        }
        table.printstd();
    }

    pub fn student(student: &Student) {
        let mut table = Table::new();
        let date_format = "%Y-%m-%d %H:%M";

        table.add_row(row!["Name", student.name]);
        table.add_row(row!["Age", format!("{} ({})", student.age, student.age_group())]);
        table.add_row(row!["Department", student.department]);
        table.add_row(row!["Email", student.email.as_deref().unwrap_or("-")]);
        table.add_row(row!["Phone", student.phone_number.as_deref().unwrap_or("-")]);
        table.add_row(row!["Enrolled", student.enrollment_date.format("%Y-%m-%d")]);
        table.add_row(row!["GPA", format!("{:.2} ({})", student.gpa, student.letter_grade())]);
        table.add_row(row!["Active", if student.is_active { "yes" } else { "no" }]);
        table.add_row(row!["Created", student.created_date.format(date_format)]);
        table.add_row(row!["Modified", student.modified_date.format(date_format)]);
        table.printstd();
    }

    pub fn statistics(stats: &StudentStatistics) {
        let mut table = Table::new();

        table.add_row(row!["Total students", stats.total_students]);
        table.add_row(row!["Active students", stats.active_students]);
        table.add_row(row!["Average age", format!("{:.1}", stats.average_age)]);
        table.add_row(row!["Average GPA", format!("{:.2}", stats.average_gpa)]);
        table.add_row(row!["Highest GPA", format!("{:.2}", stats.highest_gpa)]);
        table.add_row(row!["Lowest GPA", format!("{:.2}", stats.lowest_gpa)]);
        table.add_row(row!["Departments", stats.total_departments]);
        table.printstd();
    }

    pub fn department_statistics(departments: &[DepartmentStatistics]) {
        let mut table = Table::new();

        table.add_row(row!["DEPARTMENT", "STUDENTS", "AVG AGE", "AVG GPA", "MAX GPA", "MIN GPA"]);
        for department in departments {
            table.add_row(row![
                department.department,
                department.student_count,
                format!("{:.1}", department.average_age),
                format!("{:.2}", department.average_gpa),
                format!("{:.2}", department.highest_gpa),
                format!("{:.2}", department.lowest_gpa)
            ]);
        }
        table.printstd();
    }

    pub fn migrations(history: &[(u32, String, String)]) {
        let mut table = Table::new();

        table.add_row(row!["VERSION", "NAME", "APPLIED AT"]);
        for (version, name, applied_at) in history {
            table.add_row(row![version, name, applied_at]);
        }
        table.printstd();
    }
}
