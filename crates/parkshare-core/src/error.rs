//! Validation errors for client-side checks on request payloads.

use chrono::NaiveDate;

/// A payload the backend would reject, caught before the request is sent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("prices must not be negative")]
    NegativePrice,

    #[error("minimum price {min} is above maximum price {max}")]
    PriceRange { min: f64, max: f64 },

    #[error("page size must be between 1 and 100, got {0}")]
    PageSize(u32),

    #[error("end date {end} is before start date {start}")]
    DateRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown booking status: {0:?}")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            ValidationError::MissingField("title").to_string(),
            "missing required field: title"
        );
        assert_eq!(
            ValidationError::PageSize(0).to_string(),
            "page size must be between 1 and 100, got 0"
        );
        assert!(ValidationError::UnknownStatus("x".into())
            .to_string()
            .contains("\"x\""));
    }
}
