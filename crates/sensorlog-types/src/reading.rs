//! Core types for sensor readings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Field, ValidationError, ValidationResult};

/// Producer-assigned position of a reading on the time axis.
///
/// Timestamps are plain 64-bit integers; producers pick the unit (the
/// reference deployment uses seconds since the Unix epoch) and the store
/// relies only on their ordering. `0` is the conventional "nothing consumed
/// yet" checkpoint value, sorting below any real reading.
pub type Timestamp = i64;

/// Identifier assigned to a reading when it is appended.
///
/// Ids grow in insertion order and break ordering ties between readings
/// that share a timestamp.
pub type ReadingId = i64;

/// Maximum length of the `data` and `description` fields, in characters.
///
/// The limit counts Unicode scalar values, not bytes, so a reading full of
/// multi-byte characters is still accepted.
pub const MAX_FIELD_LEN: usize = 80;

/// One sensor observation.
///
/// Readings are immutable once appended to a log; this type carries no
/// identity of its own (see `StoredReading` in sensorlog-store for the
/// persisted form, which adds the id assigned at append time).
///
/// Timestamps are not required to be unique: several sensors can report
/// the same instant, and a producer may legitimately resend a reading.
///
/// # Examples
///
/// ```
/// use sensorlog_types::Reading;
///
/// let reading = Reading::new(1_700_000_000, "23.5C", "kitchen")?;
/// assert_eq!(reading.data, "23.5C");
/// # Ok::<(), sensorlog_types::ValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Producer-assigned timestamp.
    pub timestamp: Timestamp,
    /// The measured value(s), at most [`MAX_FIELD_LEN`] characters.
    pub data: String,
    /// Free-form label (sensor name, location, units), at most
    /// [`MAX_FIELD_LEN`] characters.
    pub description: String,
}

impl Reading {
    /// Create a reading, checking the field-length bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FieldTooLong`] if `data` or `description`
    /// exceeds [`MAX_FIELD_LEN`] characters.
    #[must_use = "validation returns a Result that should be handled"]
    pub fn new(
        timestamp: Timestamp,
        data: impl Into<String>,
        description: impl Into<String>,
    ) -> ValidationResult<Self> {
        let reading = Self {
            timestamp,
            data: data.into(),
            description: description.into(),
        };
        reading.validate()?;
        Ok(reading)
    }

    /// Re-check the field-length bounds.
    ///
    /// Useful after mutating the public fields of a reading built earlier.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FieldTooLong`] if a field exceeds
    /// [`MAX_FIELD_LEN`] characters.
    pub fn validate(&self) -> ValidationResult<()> {
        Self::validate_fields(&self.data, &self.description)
    }

    /// Check field-length bounds without constructing a reading.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::FieldTooLong`] if a field exceeds
    /// [`MAX_FIELD_LEN`] characters.
    pub fn validate_fields(data: &str, description: &str) -> ValidationResult<()> {
        check_len(Field::Data, data)?;
        check_len(Field::Description, description)?;
        Ok(())
    }
}

fn check_len(field: Field, value: &str) -> ValidationResult<()> {
    let len = value.chars().count();
    if len > MAX_FIELD_LEN {
        return Err(ValidationError::FieldTooLong {
            field,
            len,
            max: MAX_FIELD_LEN,
        });
    }
    Ok(())
}
