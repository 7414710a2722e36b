//! Checkpointed local persistence for sensor readings.
//!
//! This crate pairs two SQLite-backed components under one store
//! directory:
//!
//! - [`ReadingLog`]: an append-only, time-indexed log of readings.
//!   Appends are durable once they return; scans are lazy, batched, and
//!   never block appenders.
//! - [`CheckpointRegister`]: a single persistent timestamp recording how
//!   far consumers have processed the log, advanced by compare-and-swap
//!   so racing consumers cannot double-advance past the same batch.
//!
//! [`Store`] opens both components; [`Consumer`] packages the resume,
//! fetch, commit loop on top of them.
//!
//! # Example
//!
//! ```
//! use sensorlog_store::{Consumer, Store};
//!
//! let store = Store::open_in_memory()?;
//!
//! store.log().append(1_700_000_000, "23.5C", "kitchen")?;
//! store.log().append(1_700_000_060, "24.1C", "kitchen")?;
//!
//! let mut consumer = Consumer::resume(&store)?;
//! let batch = consumer.next_batch(500)?;
//! assert_eq!(batch.len(), 2);
//!
//! let outcome = consumer.commit(1_700_000_060)?;
//! assert!(outcome.is_advanced());
//! # Ok::<(), sensorlog_store::Error>(())
//! ```

mod checkpoint;
mod consumer;
mod error;
mod log;
mod models;
mod queries;
mod schema;
mod source;
mod store;

pub use checkpoint::{AdvanceOutcome, CheckpointRegister};
pub use consumer::Consumer;
pub use error::{Error, Result};
pub use log::{ReadingLog, Readings};
pub use models::StoredReading;
pub use queries::{DEFAULT_BATCH_SIZE, ReadingQuery};
pub use store::Store;

// Re-exported so downstream code can name reading types without a separate
// dependency on sensorlog-types.
pub use sensorlog_types::{Field, MAX_FIELD_LEN, Reading, ReadingId, Timestamp, ValidationError};

/// Default store directory following platform conventions.
///
/// - Linux: `~/.local/share/sensorlog`
/// - macOS: `~/Library/Application Support/sensorlog`
/// - Windows: `C:\Users\<user>\AppData\Local\sensorlog`
pub fn default_store_dir() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("sensorlog")
}
