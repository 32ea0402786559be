//! Display implementation for roster messages.
//!
//! All user-facing text lives in this one match, so wording stays consistent
//! across commands and every parameterised message is formatted in one place.
//!
//! ```rust
//! use roster::libs::messages::Message;
//!
//! assert_eq!(Message::StudentAdded(3).to_string(), "Student #3 added");
//! ```

use super::types::Message;
use std::fmt::{Display, Formatter, Result};

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let text = match self {
            // === STUDENT MESSAGES ===
            Message::StudentAdded(id) => format!("Student #{} added", id),
            Message::StudentUpdated(id) => format!("Student #{} updated", id),
            Message::StudentDeactivated(id) => format!("Student #{} marked inactive", id),
            Message::StudentAlreadyInactive(id) => format!("Student #{} is already inactive or does not exist", id),
            Message::StudentDeleted(id) => format!("Student #{} permanently deleted", id),
            Message::StudentNotFound(id) => format!("Student #{} not found", id),
            Message::StudentsHeader => "Students".to_string(),
            Message::StudentsPage { page, pages, total } => format!("Page {} of {} ({} students)", page, pages, total),
            Message::NoStudentsFound => "No students found".to_string(),
            Message::SearchResultsHeader(count) => format!("Search results: {} student(s)", count),
            Message::StudentDetailsHeader(id) => format!("Student #{}", id),
            Message::StudentValidationFailed(reason) => format!("Student record is not valid: {}", reason),
            Message::ConfirmDeleteStudent(name) => format!("Permanently delete '{}'? This cannot be undone", name),
            Message::DeleteCancelled => "Deletion cancelled".to_string(),

            // === IMPORT MESSAGES ===
            Message::ImportReading(path) => format!("Reading students from {}", path),
            Message::ImportEmpty => "Import file contains no students".to_string(),
            Message::ImportCompleted(count) => format!("Imported {} student(s)", count),
            Message::ImportRolledBack(count) => {
                format!("Import rolled back, nothing was saved ({} record(s) were accepted before the failure)", count)
            }

            // === STATISTICS MESSAGES ===
            Message::StatisticsHeader => "Student statistics (all records)".to_string(),
            Message::DepartmentStatisticsHeader => "Department statistics (active students)".to_string(),
            Message::NoDepartmentStatistics => "No active students in any department".to_string(),

            // === CONNECTION MESSAGES ===
            Message::ConnectionOk(path) => format!("Database is reachable: {}", path),
            Message::ConnectionFailed(path) => format!("Cannot open database: {}", path),
            Message::OperationTimedOut => "The database did not respond in time".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigInvalidEnv(name, value) => format!("Ignoring {}={}: not a valid value", name, value),
            Message::ConfigInvalidValue(key, value) => format!("Ignoring {} = {} in config.json, using the default", key, value),
            Message::PromptDatabasePath => "Database file".to_string(),
            Message::PromptPageSize => "Default page size".to_string(),
            Message::PromptEnableLogging => "Enable logging".to_string(),
            Message::PromptTimeoutSecs => "Operation timeout in seconds (0 for none)".to_string(),

            // === MIGRATION MESSAGES ===
            Message::MigrationsFound(count) => format!("Found {} pending database migrations", count),
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationCompleted(version) => format!("✓ Migration v{} completed", version),
            Message::MigrationFailed(version, error) => format!("✗ Migration v{} failed: {}", version, error),
            Message::AllMigrationsCompleted => "All database migrations completed successfully".to_string(),
            Message::DatabaseUpToDate => "Database schema is up to date".to_string(),
            Message::DatabaseVersion(version) => format!("Current database version: {}", version),
            Message::MigrationHistory => "Migration history:".to_string(),
        };

        write!(f, "{}", text)
    }
}
