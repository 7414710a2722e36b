//! The append-only reading log.
//!
//! [`ReadingLog`] stores readings in a single SQLite database with a
//! non-unique index on `timestamp`, and serves time-ordered scans through
//! [`Readings`], a batched iterator that resumes from the last
//! `(timestamp, id)` pair it saw. Appends go through one mutex-guarded
//! write connection; every scan opens its own read connection.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use sensorlog_types::{Reading, ReadingId, Timestamp};

use crate::error::{Error, Result};
use crate::models::StoredReading;
use crate::queries::ReadingQuery;
use crate::schema;
use crate::source::{self, Source};

// Keyset batch scan. Resumes strictly after the last (timestamp, id) pair
// seen, so ties on timestamp come back in insertion order and a growing
// log never repeats a row.
const SCAN_BATCH: &str = "SELECT id, timestamp, data, description FROM readings \
                          WHERE (timestamp, id) > (?1, ?2) \
                          ORDER BY timestamp, id \
                          LIMIT ?3";

/// Append-only, time-indexed log of sensor readings.
///
/// Readings are immutable once appended; there is no update or delete.
/// Timestamps need not be unique and may arrive out of order, so scans
/// sort by `(timestamp, id)` rather than insertion order.
pub struct ReadingLog {
    write: Mutex<Connection>,
    source: Source,
}

impl ReadingLog {
    /// Open or create a reading log database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        info!("Opening reading log at {}", path.display());
        Self::from_source(Source::File(path.to_path_buf()))
    }

    /// Open a log backed by a private in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::from_source(Source::memory("sensorlog-readings"))
    }

    fn from_source(source: Source) -> Result<Self> {
        let write = source.connect()?;
        schema::initialize_readings(&write)?;
        Ok(Self {
            write: Mutex::new(write),
            source,
        })
    }

    /// Append one reading and return the id assigned to it.
    ///
    /// Fields are validated before the write; nothing is stored if
    /// validation fails. Appending the same payload twice stores two
    /// readings, which is a legal log state.
    pub fn append(&self, timestamp: Timestamp, data: &str, description: &str) -> Result<ReadingId> {
        Reading::validate_fields(data, description)?;

        let conn = source::lock(&self.write);
        conn.execute(
            "INSERT INTO readings (timestamp, data, description) VALUES (?1, ?2, ?3)",
            rusqlite::params![timestamp, data, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Scan readings matching a query.
    ///
    /// The returned iterator owns a read connection of its own, so an
    /// in-flight scan never blocks [`append`](Self::append).
    pub fn query(&self, query: &ReadingQuery) -> Result<Readings> {
        debug!(
            "Scanning readings after {:?} (limit {:?}, batch size {})",
            query.after, query.limit, query.batch_size
        );
        let conn = self.source.connect()?;
        Ok(Readings::new(conn, query))
    }

    /// All readings with a timestamp strictly greater than `after`,
    /// ascending.
    ///
    /// Passing a checkpoint value yields exactly the not-yet-consumed
    /// readings. `query_after(0)` returns the whole log under the
    /// convention that real readings carry positive timestamps.
    pub fn query_after(&self, after: Timestamp) -> Result<Readings> {
        self.query(&ReadingQuery::new().after(after))
    }

    /// Count all readings in the log.
    pub fn count(&self) -> Result<u64> {
        let conn = self.source.connect()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM readings", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Lazy, time-ordered scan over stored readings.
///
/// Created by [`ReadingLog::query`]. Yields readings ascending by
/// `(timestamp, id)`, fetching `batch_size` rows per round trip, and holds
/// no database state between batches: dropping a scan midway costs
/// nothing, and a scan can keep going to the end of a log that is still
/// growing. Readings visible when the scan started are always returned;
/// readings appended while it runs may or may not be.
pub struct Readings {
    conn: Connection,
    last_timestamp: Timestamp,
    last_id: ReadingId,
    remaining: Option<u32>,
    batch_size: u32,
    buffered: VecDeque<StoredReading>,
    done: bool,
}

impl Readings {
    fn new(conn: Connection, query: &ReadingQuery) -> Self {
        // The first batch must reduce to `timestamp > after`. Ids start at
        // 1, so the cursor (after, i64::MAX) excludes every row timestamped
        // `after` itself, while (i64::MIN, 0) excludes nothing.
        let (last_timestamp, last_id) = match query.after {
            Some(after) => (after, i64::MAX),
            None => (i64::MIN, 0),
        };

        Self {
            conn,
            last_timestamp,
            last_id,
            remaining: query.limit,
            batch_size: query.batch_size.max(1),
            buffered: VecDeque::new(),
            done: false,
        }
    }

    fn fetch_batch(&mut self) -> Result<()> {
        let limit = match self.remaining {
            Some(0) => {
                self.done = true;
                return Ok(());
            }
            Some(remaining) => self.batch_size.min(remaining),
            None => self.batch_size,
        };

        let mut stmt = self.conn.prepare_cached(SCAN_BATCH)?;
        let batch = stmt
            .query_map(
                rusqlite::params![self.last_timestamp, self.last_id, limit],
                |row| {
                    Ok(StoredReading {
                        id: row.get(0)?,
                        timestamp: row.get(1)?,
                        data: row.get(2)?,
                        description: row.get(3)?,
                    })
                },
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // A short batch means the log had nothing more past the cursor.
        if (batch.len() as u32) < limit {
            self.done = true;
        }
        if let Some(last) = batch.last() {
            self.last_timestamp = last.timestamp;
            self.last_id = last.id;
        }
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= batch.len() as u32;
        }
        self.buffered.extend(batch);

        Ok(())
    }
}

impl Iterator for Readings {
    type Item = Result<StoredReading>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffered.is_empty() && !self.done {
            if let Err(e) = self.fetch_batch() {
                self.done = true;
                return Some(Err(e));
            }
        }
        self.buffered.pop_front().map(Ok)
    }
}
