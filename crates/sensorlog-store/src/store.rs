//! Store facade: both components under one directory.

use std::path::Path;

use tracing::info;

use crate::checkpoint::CheckpointRegister;
use crate::error::{Error, Result};
use crate::log::ReadingLog;

const READINGS_DB: &str = "readings.db";
const CHECKPOINT_DB: &str = "checkpoint.db";

/// A reading log and a checkpoint register sharing a store directory.
///
/// The two components live in separate database files, so appends and
/// checkpoint advances never serialize against each other: an append can
/// land while an advance is mid-flight and neither waits.
pub struct Store {
    log: ReadingLog,
    checkpoint: CheckpointRegister,
}

impl Store {
    /// Open or create a store in the given directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();

        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| Error::CreateDirectory {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening store at {}", dir.display());
        let log = ReadingLog::open(dir.join(READINGS_DB))?;
        let checkpoint = CheckpointRegister::open(dir.join(CHECKPOINT_DB))?;

        Ok(Self { log, checkpoint })
    }

    /// Open the default store location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_store_dir())
    }

    /// Open a store backed by in-memory databases (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            log: ReadingLog::open_in_memory()?,
            checkpoint: CheckpointRegister::open_in_memory()?,
        })
    }

    /// The append-only reading log.
    #[must_use]
    pub fn log(&self) -> &ReadingLog {
        &self.log
    }

    /// The checkpoint register.
    #[must_use]
    pub fn checkpoint(&self) -> &CheckpointRegister {
        &self.checkpoint
    }
}
