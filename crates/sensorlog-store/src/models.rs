//! Data models for stored readings.

use serde::{Deserialize, Serialize};

use sensorlog_types::{Reading, ReadingId, Timestamp};

/// A reading stored in the log.
///
/// The payload of a [`Reading`] plus the id the log assigned when the
/// reading was appended. Ids grow in insertion order and break ordering
/// ties between readings that share a timestamp, which gives scans a
/// stable total order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReading {
    /// Id assigned at append time.
    pub id: ReadingId,
    /// Producer-assigned timestamp.
    pub timestamp: Timestamp,
    /// The measured value(s).
    pub data: String,
    /// Free-form label.
    pub description: String,
}

impl StoredReading {
    /// Convert to the plain domain type, dropping the storage id.
    #[must_use]
    pub fn to_reading(&self) -> Reading {
        Reading {
            timestamp: self.timestamp,
            data: self.data.clone(),
            description: self.description.clone(),
        }
    }
}
