//! Versioned schema migrations.
//!
//! Applied versions are recorded in a `migrations` table. Opening a
//! connection through [`Db::open`](super::db::Db::open) runs whatever is
//! pending inside a single transaction, so a failed migration leaves the
//! schema exactly as it was.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roster::db::migrations::{get_db_version, init_with_migrations};
//! use rusqlite::Connection;
//!
//! let mut conn = Connection::open("roster.db")?;
//! init_with_migrations(&mut conn)?;
//! let version = get_db_version(&conn)?;
//! # Ok::<(), roster::libs::error::RosterError>(())
//! ```

use crate::libs::error::Result;
use crate::libs::messages::Message;
use crate::{msg_debug, msg_error};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};

const MIGRATIONS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS migrations (
    id INTEGER PRIMARY KEY,
    version INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    applied_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

#[derive(Debug, Clone)]
struct Migration {
    version: u32,
    name: &'static str,
    up: fn(&Transaction) -> rusqlite::Result<()>,
}

/// Registry of every known migration, in version order.
pub struct MigrationManager {
    migrations: Vec<Migration>,
}

impl MigrationManager {
    pub fn new() -> Self {
        let mut manager = Self { migrations: Vec::new() };
        manager.register_migrations();
        manager
    }

    fn register_migrations(&mut self) {
        // Version 1: students table. AUTOINCREMENT keeps ids from ever being reused.
        self.add_migration(1, "create_students", |tx| {
            tx.execute(
                "CREATE TABLE IF NOT EXISTS students (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    age INTEGER NOT NULL CHECK (age BETWEEN 16 AND 100),
                    department TEXT NOT NULL,
                    email TEXT UNIQUE,
                    phone_number TEXT,
                    enrollment_date TIMESTAMP NOT NULL,
                    gpa REAL NOT NULL DEFAULT 0.0 CHECK (gpa BETWEEN 0.0 AND 4.0),
                    is_active BOOLEAN NOT NULL DEFAULT TRUE,
                    created_date TIMESTAMP NOT NULL,
                    modified_date TIMESTAMP NOT NULL,
                    CHECK (created_date <= modified_date)
                )",
                [],
            )?;
            Ok(())
        });

        // Version 2: lookup indexes for listings, search and reports
        self.add_migration(2, "add_student_indices", |tx| {
            tx.execute("CREATE INDEX IF NOT EXISTS idx_students_name ON students(name)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_students_department ON students(department)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_students_is_active ON students(is_active)", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_students_enrollment_date ON students(enrollment_date)", [])?;
            Ok(())
        });

        // Version 3: listings order names case-insensitively
        self.add_migration(3, "name_index_nocase", |tx| {
            tx.execute("DROP INDEX IF EXISTS idx_students_name", [])?;
            tx.execute("CREATE INDEX IF NOT EXISTS idx_students_name_nocase ON students(name COLLATE NOCASE)", [])?;
            Ok(())
        });
    }

    fn add_migration(&mut self, version: u32, name: &'static str, up: fn(&Transaction) -> rusqlite::Result<()>) {
        self.migrations.push(Migration { version, name, up });
    }

    /// Applies every migration newer than the recorded version.
    ///
    /// The pending set is re-read under a write lock, so two processes opening
    /// a fresh database at once apply each migration exactly once.
    pub fn run_migrations(&self, conn: &mut Connection) -> Result<()> {
        conn.execute(MIGRATIONS_TABLE, [])?;

        if self.get_current_version(conn)? >= self.latest_version() {
            msg_debug!(Message::DatabaseUpToDate);
            return Ok(());
        }

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let current_version = self.get_current_version(&tx)?;
        let pending: Vec<&Migration> = self.migrations.iter().filter(|m| m.version > current_version).collect();

        msg_debug!(Message::MigrationsFound(pending.len()));

        for migration in pending {
            msg_debug!(Message::RunningMigration(migration.version, migration.name.to_string()));

            if let Err(e) = (migration.up)(&tx) {
                msg_error!(Message::MigrationFailed(migration.version, e.to_string()));
                return Err(e.into());
            }
            tx.execute(
                "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
                params![migration.version, migration.name],
            )?;
            msg_debug!(Message::MigrationCompleted(migration.version));
        }
        tx.commit()?;
        msg_debug!(Message::AllMigrationsCompleted);

        Ok(())
    }

    fn get_current_version(&self, conn: &Connection) -> Result<u32> {
        let version: Option<u32> = conn.query_row("SELECT MAX(version) FROM migrations", [], |row| row.get(0))?;

        Ok(version.unwrap_or(0))
    }

    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map(|m| m.version).unwrap_or(0)
    }

    pub fn is_migration_applied(&self, conn: &Connection, version: u32) -> Result<bool> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM migrations WHERE version = ?1", params![version], |row| row.get(0))?;

        Ok(count > 0)
    }

    /// Applied migrations as `(version, name, applied_at)`, oldest first.
    pub fn get_migration_history(&self, conn: &Connection) -> Result<Vec<(u32, String, String)>> {
        let mut stmt = conn.prepare("SELECT version, name, applied_at FROM migrations ORDER BY version")?;

        let history = stmt
            .query_map([], |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(history)
    }
}

impl Default for MigrationManager {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_with_migrations(conn: &mut Connection) -> Result<()> {
    MigrationManager::new().run_migrations(conn)
}

pub fn get_db_version(conn: &Connection) -> Result<u32> {
    MigrationManager::new().get_current_version(conn)
}

pub fn needs_migration(conn: &Connection) -> Result<bool> {
    let manager = MigrationManager::new();
    Ok(manager.get_current_version(conn)? < manager.latest_version())
}
