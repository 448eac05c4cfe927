//! Functional validation utilities

use super::types::{Error, Result};
use std::fmt;

/// Field validation helpers that produce [`Error::Validation`]
pub struct Validate;

impl Validate {
    /// Validate that a string is not empty or whitespace
    pub fn not_empty(value: &str, field_name: &str) -> Result<()> {
        if value.trim().is_empty() {
            Err(Error::Validation {
                field: field_name.to_string(),
                message: "must not be empty".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a number is within a range
    pub fn in_range<T>(value: T, min: T, max: T, field_name: &str) -> Result<T>
    where
        T: PartialOrd + fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(Error::Validation {
                field: field_name.to_string(),
                message: format!("value {value} is not in range [{min}, {max}]"),
            })
        } else {
            Ok(value)
        }
    }

    /// Validate using a custom predicate
    pub fn with_predicate<T, F>(
        value: T,
        predicate: F,
        field_name: &str,
        message: &str,
    ) -> Result<T>
    where
        F: FnOnce(&T) -> bool,
    {
        if predicate(&value) {
            Ok(value)
        } else {
            Err(Error::Validation {
                field: field_name.to_string(),
                message: message.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_not_empty() {
        assert!(Validate::not_empty("test", "field").is_ok());
        assert!(Validate::not_empty("", "field").is_err());
        assert!(Validate::not_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_in_range() {
        assert!(Validate::in_range(5, 1, 10, "value").is_ok());
        assert!(Validate::in_range(15, 1, 10, "value").is_err());
        assert!(Validate::in_range(-1, 1, 10, "value").is_err());
    }

    #[test]
    fn test_validate_with_predicate() {
        let is_even = |n: &i32| n % 2 == 0;
        assert!(Validate::with_predicate(4, is_even, "n", "must be even").is_ok());
        let err = Validate::with_predicate(3, is_even, "n", "must be even").unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }
}
