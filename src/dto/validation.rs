//! Validation helpers for DTOs.

use validator::ValidationError;

/// Alphabet used for join codes. Visually-confusable characters (I, O, 0, 1)
/// are excluded.
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Fixed length of a join code.
pub const JOIN_CODE_LENGTH: usize = 6;

/// Longest display name accepted for rooms, players, and stories.
const MAX_NAME_LENGTH: usize = 64;

/// Validates that a join code is exactly six characters from the unambiguous
/// alphabet.
///
/// # Examples
///
/// ```ignore
/// validate_join_code("BQX7Y4") // Ok
/// validate_join_code("BQX7Y")  // Err - too short
/// validate_join_code("BQX0Y4") // Err - ambiguous character
/// ```
pub fn validate_join_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != JOIN_CODE_LENGTH {
        let mut err = ValidationError::new("join_code_length");
        err.message = Some(
            format!(
                "join code must be exactly {} characters (got {})",
                JOIN_CODE_LENGTH,
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !code
        .bytes()
        .all(|byte| JOIN_CODE_ALPHABET.contains(&byte))
    {
        let mut err = ValidationError::new("join_code_format");
        err.message = Some("join code contains characters outside the allowed alphabet".into());
        return Err(err);
    }

    Ok(())
}

/// Validates a display name: non-blank after trimming and within bounds.
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("name must not be blank".into());
        return Err(err);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        let mut err = ValidationError::new("name_length");
        err.message = Some(format!("name must be at most {MAX_NAME_LENGTH} characters").into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_join_code_valid() {
        assert!(validate_join_code("ABCDEF").is_ok());
        assert!(validate_join_code("23456789".get(0..6).unwrap()).is_ok());
        assert!(validate_join_code("ZZZZZZ").is_ok());
    }

    #[test]
    fn test_validate_join_code_invalid_length() {
        assert!(validate_join_code("ABCDE").is_err()); // too short
        assert!(validate_join_code("ABCDEFG").is_err()); // too long
        assert!(validate_join_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_join_code_invalid_characters() {
        assert!(validate_join_code("ABCDE0").is_err()); // ambiguous zero
        assert!(validate_join_code("ABCDE1").is_err()); // ambiguous one
        assert!(validate_join_code("ABCDEI").is_err()); // ambiguous I
        assert!(validate_join_code("ABCDEO").is_err()); // ambiguous O
        assert!(validate_join_code("abcdef").is_err()); // lowercase
        assert!(validate_join_code("ABC EF").is_err()); // space
    }

    #[test]
    fn test_validate_display_name() {
        assert!(validate_display_name("Ada").is_ok());
        assert!(validate_display_name("  ").is_err());
        assert!(validate_display_name(&"x".repeat(65)).is_err());
    }
}
