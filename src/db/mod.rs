//! Database layer for roster.
//!
//! SQLite persistence for student records. Nothing outside this module
//! issues SQL.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roster::db::students::Students;
//! use roster::libs::student::Student;
//!
//! let students = Students::new("roster.db");
//! let id = students.add(&Student::new("Bo Lee", 17, "Math").with_gpa(2.1))?;
//! assert!(students.soft_delete(id)?);
//! # Ok::<(), roster::libs::error::RosterError>(())
//! ```

/// Short-lived connections: opening, pragmas and per-operation deadlines.
pub mod db;

/// Versioned schema migrations applied whenever a connection is opened.
pub mod migrations;

/// The student repository: CRUD, paging, search, statistics and bulk insert.
pub mod students;
