// Validation utilities module
// Custom validator functions shared by request DTOs

use validator::ValidationError;

/// Rejects empty or whitespace-only strings
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("must_not_be_blank"))
    } else {
        Ok(())
    }
}
