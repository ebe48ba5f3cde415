//! # Validation Utilities
//!
//! Input validation helpers.

/// Validate that a string is not empty.
pub fn validate_not_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate maximum length in characters.
pub fn validate_max_length(value: &str, max: usize, field_name: &str) -> Result<(), String> {
    if value.chars().count() > max {
        Err(format!("{} must be at most {} characters", field_name, max))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_is_empty() {
        assert!(validate_not_empty("   \n", "message").is_err());
        assert!(validate_not_empty(" hi ", "message").is_ok());
    }

    #[test]
    fn test_max_length_counts_chars() {
        assert!(validate_max_length("héllo", 5, "message").is_ok());
        assert_eq!(
            validate_max_length("héllo!", 5, "message").unwrap_err(),
            "message must be at most 5 characters"
        );
    }
}
