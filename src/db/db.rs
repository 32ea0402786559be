use super::migrations::init_with_migrations;
use crate::libs::error::{Result, RosterError};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// How long a statement waits on a locked database when no deadline is set.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Virtual machine steps between deadline checks.
const PROGRESS_STEPS: i32 = 1_000;

/// SQL function lowercasing text with full Unicode rules. `LIKE` and
/// `NOCASE` only fold ASCII letters.
pub const FOLD_FUNCTION: &str = "fold";

/// A single short-lived connection.
///
/// Every repository operation opens its own `Db` and drops it before
/// returning, so no connection outlives the call that created it.
pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens `path`, applies connection pragmas and brings the schema up to date.
    ///
    /// With a `deadline`, any statement still running when it passes is
    /// interrupted and surfaces as [`RosterError::Timeout`].
    pub fn open(path: &Path, deadline: Option<Instant>) -> Result<Db> {
        let mut conn = Self::new_without_migrations(path)?;
        if let Some(deadline) = deadline {
            Self::install_deadline(&conn, deadline)?;
        }
        init_with_migrations(&mut conn)?;

        Ok(Db { conn })
    }

    /// Opens `path` with pragmas applied but without touching the schema.
    pub fn new_without_migrations(path: &Path) -> Result<Connection> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.create_scalar_function(
            FOLD_FUNCTION,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<Option<String>>(0)?.map(|text| text.to_lowercase())),
        )?;

        Ok(conn)
    }

    /// Opens an existing database, touches its schema table and closes it.
    ///
    /// Unlike [`Db::open`] this never creates the file or runs migrations.
    pub fn probe(path: &Path) -> Result<()> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(path, flags)?;
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn install_deadline(conn: &Connection, deadline: Instant) -> Result<()> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(RosterError::Timeout);
        }

        // SQLite counts whole milliseconds; round up so a lock wait never
        // gives up just short of the deadline.
        let busy_timeout = if remaining < DEFAULT_BUSY_TIMEOUT {
            remaining + Duration::from_millis(1)
        } else {
            DEFAULT_BUSY_TIMEOUT
        };
        conn.busy_timeout(busy_timeout)?;
        conn.progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= deadline));
        Ok(())
    }
}
