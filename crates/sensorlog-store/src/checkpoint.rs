//! The single-row checkpoint register.
//!
//! [`CheckpointRegister`] records how far consumers have processed the
//! reading log: one timestamp, initialized to `0` when the store is first
//! created and only ever moved forward. Advancing is a compare-and-swap,
//! so two consumers racing past the same batch cannot both win; the loser
//! re-reads and decides what its batch is still worth.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::{debug, info};

use sensorlog_types::Timestamp;

use crate::error::{Error, Result};
use crate::schema;
use crate::source::{self, Source};

const READ_CHECKPOINT: &str = "SELECT timestamp FROM checkpoint WHERE id = 1";

// The WHERE clause carries the compare half of the compare-and-swap: zero
// rows changed means someone else moved the register first.
const CAS_CHECKPOINT: &str = "UPDATE checkpoint SET timestamp = ?2 WHERE id = 1 AND timestamp = ?1";

/// Outcome of a checkpoint advance.
///
/// Both outcomes are successful calls; a conflict is an expected result of
/// racing consumers, not an error. The enum is `#[must_use]` because
/// ignoring a conflict silently drops the information that this consumer's
/// view of the register is stale.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The register held the expected value and now holds the new one.
    Advanced,
    /// The register held something else; nothing was changed.
    Conflict,
}

impl AdvanceOutcome {
    /// True if the advance won.
    pub fn is_advanced(self) -> bool {
        matches!(self, AdvanceOutcome::Advanced)
    }
}

/// Persistent consumer position over the reading log.
///
/// The register lives in its own database file, disjoint from the reading
/// log, so advancing never contends with appends on a write lock.
pub struct CheckpointRegister {
    write: Mutex<Connection>,
    read: Mutex<Connection>,
}

impl CheckpointRegister {
    /// Open or create a checkpoint register database at the given path.
    ///
    /// A fresh register holds `0`; an existing one keeps whatever value it
    /// last held.
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

        info!("Opening checkpoint register at {}", path.display());
        Self::from_source(Source::File(path.to_path_buf()))
    }

    /// Open a register backed by a private in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::from_source(Source::memory("sensorlog-checkpoint"))
    }

    fn from_source(source: Source) -> Result<Self> {
        let write = source.connect()?;
        schema::initialize_checkpoint(&write)?;
        let read = source.connect()?;
        Ok(Self {
            write: Mutex::new(write),
            read: Mutex::new(read),
        })
    }

    /// The current checkpoint value.
    ///
    /// Returns `0` if nothing has ever been consumed. Reads go through a
    /// dedicated connection and never wait on an in-flight advance.
    pub fn read(&self) -> Result<Timestamp> {
        let conn = source::lock(&self.read);
        let timestamp = conn.query_row(READ_CHECKPOINT, [], |row| row.get(0))?;
        Ok(timestamp)
    }

    /// Move the register from `expected` to `new_value` atomically.
    ///
    /// Succeeds with [`AdvanceOutcome::Advanced`] only if the register
    /// still holds `expected`; otherwise nothing changes and the call
    /// reports [`AdvanceOutcome::Conflict`]. Advancing to the value the
    /// register already holds (with `expected` equal to it) is a valid
    /// no-op and reports `Advanced`, which makes retries after a lost
    /// response safe.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CheckpointRegression`] if `new_value` is smaller
    /// than `expected`; the register is left untouched.
    pub fn advance(&self, expected: Timestamp, new_value: Timestamp) -> Result<AdvanceOutcome> {
        if new_value < expected {
            return Err(Error::CheckpointRegression {
                expected,
                requested: new_value,
            });
        }

        let changed = {
            let conn = source::lock(&self.write);
            conn.execute(CAS_CHECKPOINT, rusqlite::params![expected, new_value])?
        };

        if changed == 1 {
            debug!("Advanced checkpoint from {} to {}", expected, new_value);
            Ok(AdvanceOutcome::Advanced)
        } else {
            debug!(
                "Checkpoint advance from {} to {} lost to a concurrent writer",
                expected, new_value
            );
            Ok(AdvanceOutcome::Conflict)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_register_reads_zero() {
        let register = CheckpointRegister::open_in_memory().unwrap();
        assert_eq!(register.read().unwrap(), 0);
    }

    #[test]
    fn test_advance_moves_the_register() {
        let register = CheckpointRegister::open_in_memory().unwrap();

        let outcome = register.advance(0, 150).unwrap();
        assert!(outcome.is_advanced());
        assert_eq!(register.read().unwrap(), 150);

        let outcome = register.advance(150, 300).unwrap();
        assert!(outcome.is_advanced());
        assert_eq!(register.read().unwrap(), 300);
    }

    #[test]
    fn test_advance_to_same_value_is_idempotent() {
        let register = CheckpointRegister::open_in_memory().unwrap();
        assert!(register.advance(0, 150).unwrap().is_advanced());

        // Retrying the exact advance (after a lost response, say) wins again
        let outcome = register.advance(150, 150).unwrap();
        assert!(outcome.is_advanced());
        assert_eq!(register.read().unwrap(), 150);
    }

    #[test]
    fn test_stale_expectation_conflicts_without_change() {
        let register = CheckpointRegister::open_in_memory().unwrap();
        assert!(register.advance(0, 100).unwrap().is_advanced());

        // Believes the register is still at 0
        let outcome = register.advance(0, 50).unwrap();
        assert_eq!(outcome, AdvanceOutcome::Conflict);
        assert_eq!(register.read().unwrap(), 100);
    }

    #[test]
    fn test_backward_advance_is_rejected() {
        let register = CheckpointRegister::open_in_memory().unwrap();
        assert!(register.advance(0, 100).unwrap().is_advanced());

        let err = register.advance(100, 50).unwrap_err();
        assert!(err.is_validation());
        assert!(!err.is_retryable());

        // The register is untouched
        assert_eq!(register.read().unwrap(), 100);
    }

    #[test]
    fn test_concurrent_advance_has_single_winner() {
        let register = CheckpointRegister::open_in_memory().unwrap();

        let outcomes = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| register.advance(0, 10).unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect::<Vec<_>>()
        });

        let wins = outcomes.iter().filter(|o| o.is_advanced()).count();
        assert_eq!(wins, 1);
        assert_eq!(outcomes.len(), 8);
        assert_eq!(register.read().unwrap(), 10);
    }

    #[test]
    fn test_register_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.db");

        {
            let register = CheckpointRegister::open(&path).unwrap();
            assert!(register.advance(0, 500).unwrap().is_advanced());
        }

        // Reopening must not re-seed the register back to 0
        let register = CheckpointRegister::open(&path).unwrap();
        assert_eq!(register.read().unwrap(), 500);
    }
}
