//! Validation helpers shared by the config sections

pub use crate::error::ValidationError;

/// A section of the config file that can validate and merge itself
pub trait ConfigSection: Default {
    /// Returns every invalid field in the section
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Merges another section into this one; values from `other` win
    fn merge(&mut self, other: Self);

    /// Returns the section name for error reporting
    fn section_name(&self) -> &'static str;
}

/// Common validators for config values
pub struct Validator;

impl Validator {
    /// Validates that a value lies in `min..=max`
    pub fn in_range<T>(value: T, min: T, max: T, field: &str) -> Result<(), ValidationError>
    where
        T: PartialOrd + std::fmt::Display + Copy,
    {
        if value < min || value > max {
            Err(ValidationError::with_value(
                field,
                format!("must be between {} and {}", min, max),
                value,
            ))
        } else {
            Ok(())
        }
    }

    /// Validates that a string is not blank
    pub fn not_empty(value: &str, field: &str) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            Err(ValidationError::new(field, "must not be empty"))
        } else {
            Ok(())
        }
    }

    /// Collects the failures out of several validation results
    pub fn collect_errors(
        results: Vec<Result<(), ValidationError>>,
    ) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = results.into_iter().filter_map(|r| r.err()).collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_inclusive_bounds() {
        assert!(Validator::in_range(1, 1, 120, "test").is_ok());
        assert!(Validator::in_range(120, 1, 120, "test").is_ok());
        assert!(Validator::in_range(0, 1, 120, "test").is_err());
        assert!(Validator::in_range(121, 1, 120, "test").is_err());
    }

    #[test]
    fn test_in_range_floats() {
        assert!(Validator::in_range(1.0, 0.5, 2.0, "speed").is_ok());
        assert!(Validator::in_range(2.5, 0.5, 2.0, "speed").is_err());
    }

    #[test]
    fn test_not_empty() {
        assert!(Validator::not_empty("books", "test").is_ok());
        assert!(Validator::not_empty("   ", "test").is_err());
    }

    #[test]
    fn test_collect_errors_some_err() {
        let results = vec![
            Ok(()),
            Err(ValidationError::new("field1", "error1")),
            Ok(()),
            Err(ValidationError::new("field2", "error2")),
        ];
        assert_eq!(Validator::collect_errors(results).unwrap_err().len(), 2);
    }
}
