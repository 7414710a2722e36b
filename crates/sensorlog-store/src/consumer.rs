//! Incremental consumption of the reading log.
//!
//! [`Consumer`] packages the resume loop: pick up the checkpoint, pull a
//! bounded batch of readings past it, process them, and commit the new
//! position. Because the batch query and the commit both key off the same
//! position, a consumer that crashes between the two simply sees the same
//! batch again after restarting; readings are delivered at least once and
//! never skipped.
//!
//! # Example
//!
//! ```
//! use sensorlog_store::{Consumer, Store};
//!
//! let store = Store::open_in_memory()?;
//! store.log().append(100, "23.5C", "kitchen")?;
//! store.log().append(150, "24.1C", "kitchen")?;
//!
//! let mut consumer = Consumer::resume(&store)?;
//! let batch = consumer.next_batch(500)?;
//! assert_eq!(batch.len(), 2);
//!
//! // ... process the batch ...
//!
//! if let Some(last) = batch.last() {
//!     let outcome = consumer.commit(last.timestamp)?;
//!     assert!(outcome.is_advanced());
//! }
//! # Ok::<(), sensorlog_store::Error>(())
//! ```

use tracing::debug;

use sensorlog_types::Timestamp;

use crate::checkpoint::AdvanceOutcome;
use crate::error::Result;
use crate::models::StoredReading;
use crate::queries::ReadingQuery;
use crate::store::Store;

/// A resumable cursor over a store's unconsumed readings.
///
/// The consumer holds its position in memory between calls; the durable
/// position lives in the store's checkpoint register and only moves on
/// [`commit`](Self::commit).
pub struct Consumer<'a> {
    store: &'a Store,
    position: Timestamp,
}

impl<'a> Consumer<'a> {
    /// Start a consumer from the store's current checkpoint.
    pub fn resume(store: &'a Store) -> Result<Self> {
        let position = store.checkpoint().read()?;
        debug!("Consumer resuming from checkpoint {}", position);
        Ok(Self { store, position })
    }

    /// The position this consumer last observed or committed.
    #[must_use]
    pub fn position(&self) -> Timestamp {
        self.position
    }

    /// Fetch up to `max` readings past the current position, ascending.
    ///
    /// Does not move the position: an uncommitted batch comes back again
    /// on the next call. An empty result means the consumer has caught up
    /// with the log.
    pub fn next_batch(&self, max: u32) -> Result<Vec<StoredReading>> {
        let query = ReadingQuery::new().after(self.position).limit(max);
        self.store.log().query(&query)?.collect()
    }

    /// Commit work through `through`, typically the timestamp of the last
    /// reading in the batch just processed.
    ///
    /// On [`AdvanceOutcome::Conflict`] another consumer moved the register
    /// first; this consumer's position is refreshed from the register so
    /// the caller can re-fetch and decide what its batch is still worth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CheckpointRegression`](crate::Error::CheckpointRegression)
    /// if `through` is behind the current position.
    pub fn commit(&mut self, through: Timestamp) -> Result<AdvanceOutcome> {
        let outcome = self.store.checkpoint().advance(self.position, through)?;
        match outcome {
            AdvanceOutcome::Advanced => self.position = through,
            AdvanceOutcome::Conflict => self.position = self.store.checkpoint().read()?,
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_starts_at_checkpoint() {
        let store = Store::open_in_memory().unwrap();
        assert_eq!(Consumer::resume(&store).unwrap().position(), 0);

        assert!(store.checkpoint().advance(0, 75).unwrap().is_advanced());
        assert_eq!(Consumer::resume(&store).unwrap().position(), 75);
    }

    #[test]
    fn test_batch_then_commit_advances() {
        let store = Store::open_in_memory().unwrap();
        store.log().append(100, "23.5C", "kitchen").unwrap();
        store.log().append(150, "24.1C", "kitchen").unwrap();

        let mut consumer = Consumer::resume(&store).unwrap();
        let batch = consumer.next_batch(500).unwrap();
        assert_eq!(batch.len(), 2);

        let through = batch.last().unwrap().timestamp;
        assert!(consumer.commit(through).unwrap().is_advanced());
        assert_eq!(consumer.position(), 150);
        assert_eq!(store.checkpoint().read().unwrap(), 150);

        // Caught up: nothing left past the committed position
        assert!(consumer.next_batch(500).unwrap().is_empty());
    }

    #[test]
    fn test_uncommitted_batch_is_redelivered() {
        let store = Store::open_in_memory().unwrap();
        store.log().append(10, "a", "d").unwrap();
        store.log().append(20, "b", "d").unwrap();

        let consumer = Consumer::resume(&store).unwrap();
        let first = consumer.next_batch(500).unwrap();
        let second = consumer.next_batch(500).unwrap();

        // No commit in between, so both calls see the same readings
        assert_eq!(first, second);
    }

    #[test]
    fn test_max_bounds_the_batch() {
        let store = Store::open_in_memory().unwrap();
        for ts in 1..=10 {
            store.log().append(ts, "v", "d").unwrap();
        }

        let mut consumer = Consumer::resume(&store).unwrap();
        let batch = consumer.next_batch(3).unwrap();
        let timestamps: Vec<_> = batch.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![1, 2, 3]);

        // Committing the partial batch makes the next one continue from it
        assert!(consumer.commit(3).unwrap().is_advanced());
        let next = consumer.next_batch(3).unwrap();
        let timestamps: Vec<_> = next.iter().map(|r| r.timestamp).collect();
        assert_eq!(timestamps, vec![4, 5, 6]);
    }

    #[test]
    fn test_losing_consumer_observes_conflict() {
        let store = Store::open_in_memory().unwrap();
        for ts in [10, 20, 30] {
            store.log().append(ts, "v", "d").unwrap();
        }

        let mut first = Consumer::resume(&store).unwrap();
        let mut second = Consumer::resume(&store).unwrap();
        first.next_batch(10).unwrap();
        second.next_batch(10).unwrap();

        assert!(first.commit(30).unwrap().is_advanced());

        // The second consumer raced and lost; its position is refreshed
        let outcome = second.commit(30).unwrap();
        assert_eq!(outcome, AdvanceOutcome::Conflict);
        assert_eq!(second.position(), 30);

        // From the refreshed position there is nothing left to fetch
        assert!(second.next_batch(10).unwrap().is_empty());
    }

    #[test]
    fn test_commit_behind_position_is_rejected() {
        let store = Store::open_in_memory().unwrap();
        store.log().append(100, "v", "d").unwrap();

        let mut consumer = Consumer::resume(&store).unwrap();
        assert!(consumer.commit(100).unwrap().is_advanced());

        let err = consumer.commit(50).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(consumer.position(), 100);
    }
}
