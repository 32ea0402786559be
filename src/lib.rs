//! # Roster - Student Records Manager
//!
//! A command-line utility and library for keeping student records in SQLite.
//!
//! ## Features
//!
//! - **Records**: Add, update, deactivate and permanently delete students
//! - **Listings**: Name-ordered pages with or without inactive students
//! - **Search**: Combined filters on name/department text, age range and GPA
//! - **Statistics**: School-wide totals and per-department breakdowns
//! - **Import**: All-or-nothing bulk insert from JSON files
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roster::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
