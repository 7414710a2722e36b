//! Connection plumbing shared by the reading log and the checkpoint register.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::Connection;

use crate::error::Result;

/// Where a component's database lives.
///
/// Every connection to a component goes through its source, so scans can
/// open extra read connections on demand without the component handing out
/// its write connection.
#[derive(Debug, Clone)]
pub(crate) enum Source {
    /// On-disk database file.
    File(PathBuf),
    /// Named shared-cache in-memory database, private to this process.
    Memory(String),
}

impl Source {
    /// A process-unique in-memory database.
    ///
    /// Shared-cache naming lets several connections reach the same
    /// in-memory data; the counter keeps independent stores from
    /// colliding on a name.
    pub(crate) fn memory(prefix: &str) -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        Source::Memory(format!("file:{prefix}-{n}?mode=memory&cache=shared"))
    }

    /// Open a new connection to the database.
    ///
    /// File-backed databases run in WAL mode so that snapshot reads never
    /// block the writer, with a busy timeout covering other store handles
    /// pointed at the same files. In-memory databases support neither
    /// pragma and skip them.
    pub(crate) fn connect(&self) -> Result<Connection> {
        match self {
            Source::File(path) => {
                let conn = Connection::open(path)?;
                conn.execute_batch(
                    "PRAGMA journal_mode = WAL;
                     PRAGMA synchronous = NORMAL;
                     PRAGMA busy_timeout = 5000;",
                )?;
                Ok(conn)
            }
            Source::Memory(uri) => Ok(Connection::open(uri)?),
        }
    }
}

/// Take a component's connection lock.
///
/// A poisoned lock still guards a usable connection: statements are atomic
/// in SQLite, so a panicking holder cannot leave the database half-written.
pub(crate) fn lock(conn: &Mutex<Connection>) -> MutexGuard<'_, Connection> {
    conn.lock().unwrap_or_else(PoisonError::into_inner)
}
