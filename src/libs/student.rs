//! Student record model.
//!
//! A plain value type describing one student, together with the field-level
//! validation rules and the derived presentation values (age group and letter
//! grade) used by listings and reports. Nothing in here touches the database.
//!
//! ## Usage
//!
//! ```rust
//! use roster::libs::student::{AgeGroup, LetterGrade, Student};
//!
//! let student = Student::new("Ann Smith", 20, "Computer Science")
//!     .with_email("ann@example.com")
//!     .with_gpa(3.8);
//!
//! assert!(student.validate().is_empty());
//! assert_eq!(student.age_group(), AgeGroup::YoungAdult);
//! assert_eq!(student.letter_grade(), LetterGrade::A);
//! ```

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;
pub const DEPARTMENT_MIN_LEN: usize = 2;
pub const DEPARTMENT_MAX_LEN: usize = 50;
pub const PHONE_MAX_LEN: usize = 15;
pub const AGE_MIN: i32 = 16;
pub const AGE_MAX: i32 = 100;
pub const GPA_MIN: f64 = 0.0;
pub const GPA_MAX: f64 = 4.0;

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
            .expect("email pattern is a valid regex")
    })
}

/// Rounds a GPA to the two decimal places the table stores.
pub fn round_gpa(gpa: f64) -> f64 {
    (gpa * 100.0).round() / 100.0
}

/// A single student record.
///
/// `id`, `created_date` and `modified_date` are owned by storage: they are
/// ignored on insert and filled in when a record is read back.
///
/// Equality only looks at `id`, `name`, `age` and `department`. Two records that
/// agree on these are the same entity even when contact details or GPA differ.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub age: i32,
    pub department: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default = "now")]
    pub enrollment_date: NaiveDateTime,
    #[serde(default)]
    pub gpa: f64,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default = "now")]
    pub created_date: NaiveDateTime,
    #[serde(default = "now")]
    pub modified_date: NaiveDateTime,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn active_by_default() -> bool {
    true
}

impl Student {
    pub fn new(name: &str, age: i32, department: &str) -> Self {
        let now = now();
        Student {
            id: 0,
            name: name.to_string(),
            age,
            department: department.to_string(),
            email: None,
            phone_number: None,
            enrollment_date: now,
            gpa: 0.0,
            is_active: true,
            created_date: now,
            modified_date: now,
        }
    }

    pub fn with_email(mut self, email: &str) -> Self {
        self.email = Some(email.to_string());
        self
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone_number = Some(phone.to_string());
        self
    }

    pub fn with_gpa(mut self, gpa: f64) -> Self {
        self.gpa = gpa;
        self
    }

    /// Email with blank values folded into `None`.
    pub fn normalized_email(&self) -> Option<&str> {
        non_blank(self.email.as_deref())
    }

    /// Phone number with blank values folded into `None`.
    pub fn normalized_phone(&self) -> Option<&str> {
        non_blank(self.phone_number.as_deref())
    }

    /// Checks every field rule and returns one message per violation.
    ///
    /// An empty vector means the record is valid. All violations are reported,
    /// not just the first one, so a form can highlight every bad field at once.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            violations.push("name is required".to_string());
        } else if !(NAME_MIN_LEN..=NAME_MAX_LEN).contains(&name_len) {
            violations.push(format!("name must be between {} and {} characters", NAME_MIN_LEN, NAME_MAX_LEN));
        }

        if !(AGE_MIN..=AGE_MAX).contains(&self.age) {
            violations.push(format!("age must be between {} and {}", AGE_MIN, AGE_MAX));
        }

        let department_len = self.department.trim().chars().count();
        if department_len == 0 {
            violations.push("department is required".to_string());
        } else if !(DEPARTMENT_MIN_LEN..=DEPARTMENT_MAX_LEN).contains(&department_len) {
            violations.push(format!(
                "department must be between {} and {} characters",
                DEPARTMENT_MIN_LEN, DEPARTMENT_MAX_LEN
            ));
        }

        if let Some(email) = self.normalized_email() {
            if !email_pattern().is_match(email) {
                violations.push("email address is not valid".to_string());
            }
        }

        if let Some(phone) = self.normalized_phone() {
            if phone.chars().count() > PHONE_MAX_LEN {
                violations.push(format!("phone number cannot exceed {} characters", PHONE_MAX_LEN));
            }
        }

        if !self.gpa.is_finite() || self.gpa < GPA_MIN || self.gpa > GPA_MAX {
            violations.push(format!("gpa must be between {:.2} and {:.2}", GPA_MIN, GPA_MAX));
        }

        violations
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    pub fn age_group(&self) -> AgeGroup {
        AgeGroup::from_age(self.age)
    }

    pub fn letter_grade(&self) -> LetterGrade {
        LetterGrade::from_gpa(self.gpa)
    }
}

impl PartialEq for Student {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.age == other.age && self.department == other.department
    }
}

impl Eq for Student {}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Age bucket shown next to a student in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    Minor,
    YoungAdult,
    Adult,
    Mature,
}

impl AgeGroup {
    pub fn from_age(age: i32) -> Self {
        match age {
            i32::MIN..=17 => AgeGroup::Minor,
            18..=24 => AgeGroup::YoungAdult,
            25..=34 => AgeGroup::Adult,
            _ => AgeGroup::Mature,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgeGroup::Minor => "Minor",
            AgeGroup::YoungAdult => "Young Adult",
            AgeGroup::Adult => "Adult",
            AgeGroup::Mature => "Mature",
        };
        write!(f, "{}", label)
    }
}

/// Letter grade derived from a 4.0-scale GPA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    D,
    F,
}

impl LetterGrade {
    /// Lowest GPA that still earns each grade, best grade first.
    const THRESHOLDS: [(f64, LetterGrade); 9] = [
        (3.7, LetterGrade::A),
        (3.3, LetterGrade::AMinus),
        (3.0, LetterGrade::BPlus),
        (2.7, LetterGrade::B),
        (2.3, LetterGrade::BMinus),
        (2.0, LetterGrade::CPlus),
        (1.7, LetterGrade::C),
        (1.3, LetterGrade::CMinus),
        (1.0, LetterGrade::D),
    ];

    pub fn from_gpa(gpa: f64) -> Self {
        let gpa = round_gpa(gpa);
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| gpa >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(LetterGrade::F)
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        };
        write!(f, "{}", label)
    }
}

/// Search criteria for `Students::search`. Every `None` field is ignored.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    pub term: Option<String>,
    pub department: Option<String>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub min_gpa: Option<f64>,
}

impl StudentFilter {
    pub fn term(mut self, term: &str) -> Self {
        self.term = Some(term.to_string());
        self
    }

    pub fn department(mut self, department: &str) -> Self {
        self.department = Some(department.to_string());
        self
    }

    pub fn age_between(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.min_age = min;
        self.max_age = max;
        self
    }

    pub fn min_gpa(mut self, gpa: f64) -> Self {
        self.min_gpa = Some(gpa);
        self
    }
}

/// Totals over every record, active or not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudentStatistics {
    pub total_students: i64,
    pub active_students: i64,
    pub average_age: f64,
    pub average_gpa: f64,
    pub highest_gpa: f64,
    pub lowest_gpa: f64,
    pub total_departments: i64,
}

/// Per-department totals over active records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentStatistics {
    pub department: String,
    pub student_count: i64,
    pub average_age: f64,
    pub average_gpa: f64,
    pub highest_gpa: f64,
    pub lowest_gpa: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Student {
        Student::new("Ann Smith", 20, "CS").with_email("ann@example.com").with_gpa(3.8)
    }

    #[test]
    fn test_valid_record_has_no_violations() {
        assert!(valid().validate().is_empty());
        assert!(Student::new("Bo", 16, "Math").is_valid());
    }

    #[test]
    fn test_all_violations_are_reported() {
        let mut student = Student::new("", 15, " ").with_email("not-an-email").with_phone("0123456789012345");
        student.gpa = 4.5;

        let violations = student.validate();
        assert_eq!(violations.len(), 6);
        assert!(violations.iter().any(|v| v.contains("name")));
        assert!(violations.iter().any(|v| v.contains("age")));
        assert!(violations.iter().any(|v| v.contains("department")));
        assert!(violations.iter().any(|v| v.contains("email")));
        assert!(violations.iter().any(|v| v.contains("phone")));
        assert!(violations.iter().any(|v| v.contains("gpa")));
    }

    #[test]
    fn test_length_limits() {
        assert!(!Student::new("A", 20, "CS").is_valid());
        assert!(!Student::new(&"x".repeat(101), 20, "CS").is_valid());
        assert!(Student::new(&"x".repeat(100), 20, "CS").is_valid());
        assert!(!Student::new("Ann", 20, &"d".repeat(51)).is_valid());
        assert!(Student::new("Ann", 20, "CS").with_phone("123456789012345").is_valid());
    }

    #[test]
    fn test_range_boundaries() {
        assert!(Student::new("Ann", 16, "CS").is_valid());
        assert!(Student::new("Ann", 100, "CS").is_valid());
        assert!(!Student::new("Ann", 101, "CS").is_valid());
        assert!(Student::new("Ann", 20, "CS").with_gpa(0.0).is_valid());
        assert!(Student::new("Ann", 20, "CS").with_gpa(4.0).is_valid());
        assert!(!Student::new("Ann", 20, "CS").with_gpa(-0.01).is_valid());
        assert!(!Student::new("Ann", 20, "CS").with_gpa(f64::NAN).is_valid());
    }

    #[test]
    fn test_blank_email_is_treated_as_absent() {
        let student = Student::new("Ann", 20, "CS").with_email("   ");
        assert!(student.is_valid());
        assert_eq!(student.normalized_email(), None);
    }

    #[test]
    fn test_email_syntax() {
        for good in ["a@b.co", "first.last+tag@uni.example.edu"] {
            assert!(Student::new("Ann", 20, "CS").with_email(good).is_valid(), "{}", good);
        }
        for bad in ["plain", "a@b", "@b.com", "a b@c.com", "a@-b.com"] {
            assert!(!Student::new("Ann", 20, "CS").with_email(bad).is_valid(), "{}", bad);
        }
    }

    #[test]
    fn test_age_groups() {
        assert_eq!(AgeGroup::from_age(16), AgeGroup::Minor);
        assert_eq!(AgeGroup::from_age(17), AgeGroup::Minor);
        assert_eq!(AgeGroup::from_age(18), AgeGroup::YoungAdult);
        assert_eq!(AgeGroup::from_age(24), AgeGroup::YoungAdult);
        assert_eq!(AgeGroup::from_age(25), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(34), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(35), AgeGroup::Mature);
        assert_eq!(AgeGroup::YoungAdult.to_string(), "Young Adult");
    }

    #[test]
    fn test_letter_grades() {
        let cases = [
            (4.0, "A"),
            (3.7, "A"),
            (3.69, "A-"),
            (3.3, "A-"),
            (3.0, "B+"),
            (2.7, "B"),
            (2.3, "B-"),
            (2.0, "C+"),
            (1.7, "C"),
            (1.3, "C-"),
            (1.0, "D"),
            (0.99, "F"),
            (0.0, "F"),
        ];
        for (gpa, grade) in cases {
            assert_eq!(LetterGrade::from_gpa(gpa).to_string(), grade, "gpa {}", gpa);
        }
    }

    #[test]
    fn test_equality_uses_identity_fields_only() {
        let a = valid();
        let mut b = a.clone();
        b.email = Some("other@example.com".to_string());
        b.gpa = 1.0;
        b.is_active = false;
        assert_eq!(a, b);

        b.department = "Math".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_is_independent() {
        let a = valid();
        let mut b = a.clone();
        b.name.push_str(" Jr");
        assert_eq!(a.name, "Ann Smith");
        assert_eq!(b.email, a.email);
    }
}
