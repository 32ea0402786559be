//! Student repository.
//!
//! [`Students`] is the only code that reads or writes the `students` table.
//! It turns listing, search, statistics and import requests into
//! parameterised SQL and maps rows back into [`Student`] values.
//!
//! ## Connection lifecycle
//!
//! The handle stores nothing but the database path and an optional timeout.
//! Every operation opens a connection, does its work and drops the connection
//! before returning, on success and on every error path alike. A `Students`
//! value can therefore be cloned freely and shared across threads.
//!
//! ## Error model
//!
//! - Bad ids, page numbers and invalid records are rejected with
//!   [`RosterError::InvalidArgument`] before any connection is opened.
//! - A duplicate email is reported by SQLite's unique index and surfaces as
//!   [`RosterError::Conflict`].
//! - A missing record is a normal outcome: `get_by_id` returns `None` and the
//!   mutating calls return `false`.
//! - Failed calls are never retried here.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roster::db::students::Students;
//! use roster::libs::student::{Student, StudentFilter};
//!
//! let students = Students::new("roster.db");
//! let id = students.add(&Student::new("Ann Smith", 20, "CS").with_gpa(3.8))?;
//! let found = students.search(&StudentFilter::default().term("ann"))?;
//! assert_eq!(found[0].id, id);
//! # Ok::<(), roster::libs::error::RosterError>(())
//! ```

use super::db::Db;
use super::db::FOLD_FUNCTION;
use crate::libs::error::{Result, RosterError};
use crate::libs::student::{round_gpa, DepartmentStatistics, Student, StudentFilter, StudentStatistics};
use chrono::{Local, NaiveDateTime};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Column order shared by every `SELECT` below and by [`map_student`].
pub const STUDENT_COLUMNS: [&str; 11] = [
    "id",
    "name",
    "age",
    "department",
    "email",
    "phone_number",
    "enrollment_date",
    "gpa",
    "is_active",
    "created_date",
    "modified_date",
];

const SELECT_STUDENTS: &str = "SELECT id, name, age, department, email, phone_number, enrollment_date, gpa, is_active, created_date, modified_date FROM students";
const WHERE_ID: &str = "WHERE id = ?1";
const NAME_ORDER: &str = "ORDER BY name COLLATE NOCASE, name, id";
const PAGE_FILTER: &str = "WHERE (?1 OR is_active = 1)";
const COUNT_STUDENTS: &str = "SELECT COUNT(*) FROM students WHERE (?1 OR is_active = 1)";
const INSERT_STUDENT: &str = "INSERT INTO students
    (name, age, department, email, phone_number, enrollment_date, gpa, is_active, created_date, modified_date)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)";
const UPDATE_STUDENT: &str = "UPDATE students SET
    name = ?2, age = ?3, department = ?4, email = ?5, phone_number = ?6,
    enrollment_date = ?7, gpa = ?8, is_active = ?9, modified_date = max(created_date, ?10)
    WHERE id = ?1";
const SOFT_DELETE_STUDENT: &str = "UPDATE students SET is_active = 0, modified_date = max(created_date, ?2) WHERE id = ?1 AND is_active = 1";
const DELETE_STUDENT: &str = "DELETE FROM students WHERE id = ?1";
const SELECT_STATISTICS: &str = "SELECT
    COUNT(*),
    COALESCE(SUM(CASE WHEN is_active THEN 1 ELSE 0 END), 0),
    COALESCE(ROUND(AVG(age), 2), 0.0),
    COALESCE(ROUND(AVG(gpa), 2), 0.0),
    COALESCE(MAX(gpa), 0.0),
    COALESCE(MIN(gpa), 0.0),
    COUNT(DISTINCT department)
    FROM students";
const SELECT_DEPARTMENT_STATISTICS: &str = "SELECT
    department,
    COUNT(*) AS student_count,
    ROUND(AVG(age), 2),
    ROUND(AVG(gpa), 2),
    MAX(gpa),
    MIN(gpa)
    FROM students
    WHERE is_active = 1
    GROUP BY department
    ORDER BY student_count DESC, department";
const SELECT_DEPARTMENTS: &str = "SELECT DISTINCT department FROM students WHERE is_active = 1 ORDER BY department";

/// Handle to the student table of one database file.
#[derive(Debug, Clone)]
pub struct Students {
    path: PathBuf,
    timeout: Option<Duration>,
}

impl Students {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Students {
            path: path.into(),
            timeout: None,
        }
    }

    /// Applies `timeout` to every operation made through the returned handle.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens and closes a connection to an existing database.
    ///
    /// Never fails: any problem is logged and reported as `false`. The
    /// database file is not created if it is missing.
    pub fn check_connection(&self) -> bool {
        match Db::probe(&self.path) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "database connectivity check failed");
                false
            }
        }
    }

    /// One page of students ordered by name.
    ///
    /// Inactive students are only included when `include_inactive` is set.
    /// `page` is 1-based; both `page` and `page_size` must be at least 1.
    pub fn list(&self, include_inactive: bool, page: i64, page_size: i64) -> Result<Vec<Student>> {
        if page < 1 {
            return Err(RosterError::invalid(format!("page must be at least 1, got {}", page)));
        }
        if page_size < 1 {
            return Err(RosterError::invalid(format!("page size must be at least 1, got {}", page_size)));
        }
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| RosterError::invalid("page is out of range"))?;

        self.run("list", |conn| {
            let mut stmt = conn.prepare(&format!("{} {} {} LIMIT ?2 OFFSET ?3", SELECT_STUDENTS, PAGE_FILTER, NAME_ORDER))?;
            let rows = stmt.query_map(params![include_inactive, page_size, offset], map_student)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Number of students `list` pages over with the same flag.
    pub fn count(&self, include_inactive: bool) -> Result<i64> {
        self.run("count", |conn| Ok(conn.query_row(COUNT_STUDENTS, params![include_inactive], |row| row.get(0))?))
    }

    /// Looks a student up by id regardless of the active flag.
    pub fn get_by_id(&self, id: i64) -> Result<Option<Student>> {
        ensure_id(id)?;

        self.run("get_by_id", |conn| {
            Ok(conn
                .query_row(&format!("{} {}", SELECT_STUDENTS, WHERE_ID), params![id], map_student)
                .optional()?)
        })
    }

    /// Active students matching every supplied criterion, ordered by name.
    ///
    /// `term` is a case-insensitive substring match on name or department.
    /// Inactive students never appear here, unlike [`Students::list`].
    pub fn search(&self, filter: &StudentFilter) -> Result<Vec<Student>> {
        let (clause, values) = build_search(filter)?;

        self.run("search", |conn| {
            let mut stmt = conn.prepare(&format!("{} {} {}", SELECT_STUDENTS, clause, NAME_ORDER))?;
            let rows = stmt.query_map(params_from_iter(values.iter()), map_student)?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Inserts a new student and returns its id.
    ///
    /// The created and modified timestamps are set to the current time; any
    /// values already on `student` are ignored, as is `student.id`.
    pub fn add(&self, student: &Student) -> Result<i64> {
        ensure_valid(student)?;

        self.run("add", |conn| {
            insert_student(conn, student, now())?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Replaces every editable field of the student with `student.id`.
    ///
    /// Returns `false` when no such student exists. `created_date` is kept and
    /// `modified_date` is refreshed even if nothing else changed.
    pub fn update(&self, student: &Student) -> Result<bool> {
        ensure_id(student.id)?;
        ensure_valid(student)?;

        self.run("update", |conn| {
            let affected = conn.execute(
                UPDATE_STUDENT,
                params![
                    student.id,
                    student.name.trim(),
                    student.age,
                    student.department.trim(),
                    student.normalized_email(),
                    student.normalized_phone(),
                    student.enrollment_date,
                    round_gpa(student.gpa),
                    student.is_active,
                    now(),
                ],
            )?;
            Ok(affected > 0)
        })
    }

    /// Marks an active student inactive.
    ///
    /// Returns `false` when the student is missing or already inactive, so a
    /// second call on the same id is a harmless no-op.
    pub fn soft_delete(&self, id: i64) -> Result<bool> {
        ensure_id(id)?;

        self.run("soft_delete", |conn| Ok(conn.execute(SOFT_DELETE_STUDENT, params![id, now()])? > 0))
    }

    /// Permanently removes a student, active or not.
    pub fn delete(&self, id: i64) -> Result<bool> {
        ensure_id(id)?;

        self.run("delete", |conn| Ok(conn.execute(DELETE_STUDENT, params![id])? > 0))
    }

    /// Totals over every student, including inactive ones.
    ///
    /// An empty table yields all-zero statistics rather than an error.
    pub fn statistics(&self) -> Result<StudentStatistics> {
        self.run("statistics", |conn| {
            Ok(conn.query_row(SELECT_STATISTICS, [], |row| {
                Ok(StudentStatistics {
                    total_students: row.get(0)?,
                    active_students: row.get(1)?,
                    average_age: row.get(2)?,
                    average_gpa: row.get(3)?,
                    highest_gpa: row.get(4)?,
                    lowest_gpa: row.get(5)?,
                    total_departments: row.get(6)?,
                })
            })?)
        })
    }

    /// Per-department totals over active students, largest department first.
    pub fn department_statistics(&self) -> Result<Vec<DepartmentStatistics>> {
        self.run("department_statistics", |conn| {
            let mut stmt = conn.prepare(SELECT_DEPARTMENT_STATISTICS)?;
            let rows = stmt.query_map([], |row| {
                Ok(DepartmentStatistics {
                    department: row.get(0)?,
                    student_count: row.get(1)?,
                    average_age: row.get(2)?,
                    average_gpa: row.get(3)?,
                    highest_gpa: row.get(4)?,
                    lowest_gpa: row.get(5)?,
                })
            })?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Distinct departments that still have active students.
    pub fn departments(&self) -> Result<Vec<String>> {
        self.run("departments", |conn| {
            let mut stmt = conn.prepare(SELECT_DEPARTMENTS)?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
        })
    }

    /// Inserts all of `students` in one transaction, or none of them.
    ///
    /// Every record is validated before the database is touched. On any
    /// failure the transaction is rolled back and the error is wrapped in
    /// [`RosterError::BulkInsert`] with the number of records that went in
    /// before the failing one. An empty slice returns `Ok(0)` without opening
    /// a connection.
    pub fn bulk_insert(&self, students: &[Student]) -> Result<usize> {
        if students.is_empty() {
            return Ok(0);
        }

        for (index, student) in students.iter().enumerate() {
            if let Err(e) = ensure_valid(student) {
                return Err(RosterError::BulkInsert {
                    inserted: index,
                    source: Box::new(e),
                });
            }
        }

        self.run("bulk_insert", |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|e| bulk_failure(0, e.into()))?;
            let timestamp = now();

            for (index, student) in students.iter().enumerate() {
                if let Err(e) = insert_student(&tx, student, timestamp) {
                    // Dropping `tx` rolls back everything inserted so far.
                    warn!(inserted = index, "bulk insert failed, rolling back");
                    return Err(bulk_failure(index, e));
                }
            }

            tx.commit().map_err(|e| bulk_failure(students.len(), e.into()))?;
            Ok(students.len())
        })
    }

    /// Opens a connection, runs `f` on it and closes it again.
    fn run<T, F>(&self, operation: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let deadline = self.timeout.map(|timeout| Instant::now() + timeout);
        debug!(operation, "running student repository operation");

        let result = Db::open(&self.path, deadline).and_then(|mut db| f(&mut db.conn));

        let result = match result {
            Err(e) if deadline.is_some_and(|d| Instant::now() >= d) => Err(into_timeout(e)),
            other => other,
        };

        match result {
            Err(e) => {
                match &e {
                    RosterError::Storage(_) => error!(operation, error = %e, "student repository operation failed"),
                    _ if e.is_timeout() => warn!(operation, error = %e, "student repository operation timed out"),
                    RosterError::BulkInsert { .. } => error!(operation, error = %e, "student repository operation failed"),
                    _ => debug!(operation, error = %e, "student repository operation rejected"),
                }
                Err(e)
            }
            ok => ok,
        }
    }
}

/// Runs a repository call on tokio's blocking pool.
///
/// Use this from async code so SQLite I/O never stalls the event loop.
pub async fn run_blocking<T, F>(students: &Students, f: F) -> Result<T>
where
    F: FnOnce(&Students) -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let students = students.clone();
    tokio::task::spawn_blocking(move || f(&students)).await?
}

/// Explicit row mapping in [`STUDENT_COLUMNS`] order.
fn map_student(row: &Row) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        department: row.get(3)?,
        email: row.get(4)?,
        phone_number: row.get(5)?,
        enrollment_date: row.get(6)?,
        gpa: round_gpa(row.get(7)?),
        is_active: row.get(8)?,
        created_date: row.get(9)?,
        modified_date: row.get(10)?,
    })
}

fn insert_student(conn: &Connection, student: &Student, timestamp: NaiveDateTime) -> Result<()> {
    conn.prepare_cached(INSERT_STUDENT)?.execute(params![
        student.name.trim(),
        student.age,
        student.department.trim(),
        student.normalized_email(),
        student.normalized_phone(),
        student.enrollment_date,
        round_gpa(student.gpa),
        student.is_active,
        timestamp,
    ])?;
    Ok(())
}

/// A storage failure seen after the deadline is reported as a timeout. A bulk
/// insert keeps its rollback count.
fn into_timeout(err: RosterError) -> RosterError {
    match err {
        RosterError::BulkInsert { inserted, source } => RosterError::BulkInsert {
            inserted,
            source: Box::new(into_timeout(*source)),
        },
        RosterError::Storage(_) => RosterError::Timeout,
        other => other,
    }
}

fn bulk_failure(inserted: usize, source: RosterError) -> RosterError {
    RosterError::BulkInsert {
        inserted,
        source: Box::new(source),
    }
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn ensure_id(id: i64) -> Result<()> {
    if id < 1 {
        return Err(RosterError::invalid(format!("id must be a positive integer, got {}", id)));
    }
    Ok(())
}

fn ensure_valid(student: &Student) -> Result<()> {
    let violations = student.validate();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(RosterError::InvalidArgument(violations.join("; ")))
    }
}

/// Escapes `LIKE` wildcards so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// `WHERE` clause and bound values for a search. No caller text reaches the SQL.
fn build_search(filter: &StudentFilter) -> Result<(String, Vec<Value>)> {
    if let (Some(min), Some(max)) = (filter.min_age, filter.max_age) {
        if min > max {
            return Err(RosterError::invalid(format!("minimum age {} is greater than maximum age {}", min, max)));
        }
    }
    if filter.min_gpa.is_some_and(|gpa| !gpa.is_finite()) {
        return Err(RosterError::invalid("minimum gpa must be a number"));
    }

    let mut clauses = vec!["is_active = 1".to_string()];
    let mut values = Vec::new();

    if let Some(term) = filter.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
        clauses.push(format!(
            "({fold}(name) LIKE ? ESCAPE '\\' OR {fold}(department) LIKE ? ESCAPE '\\')",
            fold = FOLD_FUNCTION
        ));
        values.push(Value::Text(pattern.clone()));
        values.push(Value::Text(pattern));
    }
    if let Some(department) = filter.department.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        clauses.push(format!("{}(department) = ?", FOLD_FUNCTION));
        values.push(Value::Text(department.to_lowercase()));
    }
    if let Some(min_age) = filter.min_age {
        clauses.push("age >= ?".to_string());
        values.push(Value::Integer(min_age.into()));
    }
    if let Some(max_age) = filter.max_age {
        clauses.push("age <= ?".to_string());
        values.push(Value::Integer(max_age.into()));
    }
    if let Some(min_gpa) = filter.min_gpa {
        clauses.push("gpa >= ?".to_string());
        values.push(Value::Real(min_gpa));
    }

    Ok((format!("WHERE {}", clauses.join(" AND ")), values))
}
