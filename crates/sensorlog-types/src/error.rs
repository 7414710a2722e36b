//! Error types for reading validation in sensorlog-types.

use core::fmt;

use thiserror::Error;

/// Bounded text fields of a [`Reading`](crate::Reading).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// The measurement payload.
    Data,
    /// The free-form label.
    Description,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Data => write!(f, "data"),
            Field::Description => write!(f, "description"),
        }
    }
}

/// Errors that can occur when validating a sensor reading.
///
/// Validation happens before anything touches storage, so a validation
/// failure never leaves a partial write behind.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new constraint
/// variants in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValidationError {
    /// A text field exceeds [`MAX_FIELD_LEN`](crate::MAX_FIELD_LEN) characters.
    #[error("{field} field is {len} characters, limit is {max}")]
    FieldTooLong {
        /// Which field failed.
        field: Field,
        /// Observed length in characters.
        len: usize,
        /// Maximum allowed length in characters.
        max: usize,
    },
}

/// Result type alias using sensorlog-types' ValidationError type.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
