//! Query builder for time-ordered reading scans.
//!
//! [`ReadingQuery`] describes the one scan shape the log serves: readings
//! strictly after a timestamp, ascending, optionally capped. That matches
//! how consumers resume from a checkpoint. There is no offset pagination;
//! scans resume by position, not page number.
//!
//! # Example
//!
//! ```
//! use sensorlog_store::{ReadingQuery, Store};
//!
//! let store = Store::open_in_memory()?;
//! store.log().append(100, "23.5C", "kitchen")?;
//! store.log().append(150, "24.1C", "kitchen")?;
//!
//! let query = ReadingQuery::new().after(100).limit(10);
//! let readings = store.log().query(&query)?.collect::<Result<Vec<_>, _>>()?;
//! assert_eq!(readings.len(), 1);
//! assert_eq!(readings[0].timestamp, 150);
//! # Ok::<(), sensorlog_store::Error>(())
//! ```

use sensorlog_types::Timestamp;

/// Rows fetched per round trip while iterating, unless overridden with
/// [`ReadingQuery::batch_size`].
pub const DEFAULT_BATCH_SIZE: u32 = 500;

/// Fluent query builder for reading scans.
///
/// Use this to construct scans for [`ReadingLog::query`](crate::ReadingLog::query).
/// All methods are optional and can be chained in any order. Results are
/// always ordered ascending by `(timestamp, id)`, so equal timestamps come
/// back in insertion order.
///
/// # Example
///
/// ```
/// use sensorlog_store::ReadingQuery;
///
/// // Everything past a checkpoint, in bounded batches
/// let resume = ReadingQuery::new().after(1_700_000_000).batch_size(100);
///
/// // At most fifty readings from the start of the log
/// let head = ReadingQuery::new().limit(50);
/// ```
#[derive(Debug, Clone)]
pub struct ReadingQuery {
    /// Only readings with a timestamp strictly greater than this.
    pub after: Option<Timestamp>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Rows fetched per round trip while iterating.
    pub batch_size: u32,
}

impl Default for ReadingQuery {
    fn default() -> Self {
        Self {
            after: None,
            limit: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl ReadingQuery {
    /// Create a query with default settings.
    ///
    /// Default behavior:
    /// - No lower bound (scans the whole log)
    /// - No limit (all matching readings)
    /// - Batches of [`DEFAULT_BATCH_SIZE`] rows
    pub fn new() -> Self {
        Self::default()
    }

    /// Only include readings with a timestamp strictly greater than `after`.
    ///
    /// Passing a checkpoint value yields exactly the readings not yet
    /// consumed; readings timestamped `after` itself are excluded.
    pub fn after(mut self, after: Timestamp) -> Self {
        self.after = Some(after);
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rows fetched per round trip while iterating.
    ///
    /// Smaller batches bound memory; larger batches make fewer round
    /// trips. Zero is treated as one.
    pub fn batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = batch_size;
        self
    }
}
