//! Core types for sensorlog readings.
//!
//! This crate provides the shared vocabulary used by producers appending
//! readings and by the storage layer (sensorlog-store) persisting them.
//!
//! # Features
//!
//! - [`Reading`]: one timestamped sensor observation
//! - [`Timestamp`] / [`ReadingId`]: ordering and identity on the time axis
//! - Field-length validation with structured [`ValidationError`]s
//!
//! # Example
//!
//! ```
//! use sensorlog_types::{Reading, MAX_FIELD_LEN};
//!
//! let reading = Reading::new(1_700_000_000, "23.5C", "kitchen")?;
//! assert!(reading.data.chars().count() <= MAX_FIELD_LEN);
//! # Ok::<(), sensorlog_types::ValidationError>(())
//! ```

pub mod error;
pub mod reading;

pub use error::{Field, ValidationError, ValidationResult};
pub use reading::{MAX_FIELD_LEN, Reading, ReadingId, Timestamp};

#[cfg(test)]
mod tests {
    use super::*;

    // --- Reading construction tests ---

    #[test]
    fn test_new_reading_valid() {
        let reading = Reading::new(100, "23.5C", "kitchen").unwrap();

        assert_eq!(reading.timestamp, 100);
        assert_eq!(reading.data, "23.5C");
        assert_eq!(reading.description, "kitchen");
    }

    #[test]
    fn test_new_reading_accepts_owned_and_borrowed_strings() {
        let borrowed = Reading::new(1, "a", "b").unwrap();
        let owned = Reading::new(1, String::from("a"), String::from("b")).unwrap();

        assert_eq!(borrowed, owned);
    }

    #[test]
    fn test_new_reading_empty_fields() {
        let reading = Reading::new(0, "", "").unwrap();

        assert_eq!(reading.data, "");
        assert_eq!(reading.description, "");
    }

    #[test]
    fn test_new_reading_negative_timestamp() {
        // Timestamps are opaque integers; negative values are legal.
        let reading = Reading::new(-42, "v", "pre-epoch").unwrap();
        assert_eq!(reading.timestamp, -42);
    }

    #[test]
    fn test_new_reading_at_field_limit() {
        let at_limit = "x".repeat(MAX_FIELD_LEN);

        let reading = Reading::new(1, at_limit.clone(), at_limit.clone()).unwrap();
        assert_eq!(reading.data.chars().count(), MAX_FIELD_LEN);
        assert_eq!(reading.description.chars().count(), MAX_FIELD_LEN);
    }

    #[test]
    fn test_new_reading_data_too_long() {
        let too_long = "x".repeat(MAX_FIELD_LEN + 1);

        let err = Reading::new(1, too_long, "ok").unwrap_err();
        assert_eq!(
            err,
            ValidationError::FieldTooLong {
                field: Field::Data,
                len: MAX_FIELD_LEN + 1,
                max: MAX_FIELD_LEN,
            }
        );
    }

    #[test]
    fn test_new_reading_description_too_long() {
        let too_long = "x".repeat(MAX_FIELD_LEN + 1);

        let err = Reading::new(1, "ok", too_long).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::FieldTooLong {
                field: Field::Description,
                ..
            }
        ));
    }

    #[test]
    fn test_field_limit_counts_characters_not_bytes() {
        // 80 two-byte characters: 160 bytes but exactly at the limit.
        let multibyte = "ß".repeat(MAX_FIELD_LEN);
        assert_eq!(multibyte.len(), MAX_FIELD_LEN * 2);

        let reading = Reading::new(1, multibyte, "außen").unwrap();
        assert_eq!(reading.data.chars().count(), MAX_FIELD_LEN);

        let over = "ß".repeat(MAX_FIELD_LEN + 1);
        assert!(Reading::new(1, over, "außen").is_err());
    }

    #[test]
    fn test_validate_after_field_mutation() {
        let mut reading = Reading::new(1, "ok", "ok").unwrap();
        reading.data = "y".repeat(MAX_FIELD_LEN + 5);

        let err = reading.validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::FieldTooLong {
                field: Field::Data,
                len,
                ..
            } if len == MAX_FIELD_LEN + 5
        ));
    }

    #[test]
    fn test_validate_fields_without_construction() {
        assert!(Reading::validate_fields("short", "short").is_ok());
        assert!(Reading::validate_fields(&"x".repeat(MAX_FIELD_LEN + 1), "short").is_err());
    }

    // --- Error type tests ---

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::FieldTooLong {
            field: Field::Data,
            len: 93,
            max: MAX_FIELD_LEN,
        };
        assert_eq!(err.to_string(), "data field is 93 characters, limit is 80");
    }

    #[test]
    fn test_field_display() {
        assert_eq!(Field::Data.to_string(), "data");
        assert_eq!(Field::Description.to_string(), "description");
    }

    #[test]
    fn test_validation_error_debug() {
        let err = ValidationError::FieldTooLong {
            field: Field::Description,
            len: 81,
            max: 80,
        };
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("FieldTooLong"));
        assert!(debug_str.contains("Description"));
    }

    // --- Serialization tests ---

    #[test]
    fn test_reading_serialization() {
        let reading = Reading::new(150, "24.1C", "kitchen").unwrap();

        let json = serde_json::to_string(&reading).unwrap();
        assert!(json.contains("\"timestamp\":150"));
        assert!(json.contains("\"data\":\"24.1C\""));
        assert!(json.contains("\"description\":\"kitchen\""));
    }

    #[test]
    fn test_reading_deserialization_roundtrip() {
        let reading = Reading::new(-7, "0.003 Sv", "basement radon").unwrap();

        let json = serde_json::to_string(&reading).unwrap();
        let deserialized: Reading = serde_json::from_str(&json).unwrap();

        assert_eq!(deserialized, reading);
    }
}
