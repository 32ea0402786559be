//! Core library modules for roster.
//!
//! - **Record model**: the student value type, validation and derived values
//! - **Errors**: the repository's error taxonomy
//! - **Infrastructure**: configuration, data directory, user-facing messages
//! - **Presentation**: terminal tables
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roster::libs::config::Config;
//! use roster::libs::student::Student;
//!
//! let students = Config::load()?.repository()?;
//! students.add(&Student::new("Ann Smith", 20, "Computer Science"))?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod data_storage;
pub mod error;
pub mod messages;
pub mod student;
pub mod view;
