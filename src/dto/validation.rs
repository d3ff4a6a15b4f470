//! Validation helpers for DTOs.

use validator::ValidationError;

const MAX_NAME_CHARS: usize = 64;

/// Validates that a player name is not blank and reasonably short.
///
/// # Examples
///
/// ```ignore
/// validate_player_name("Efren")  // Ok
/// validate_player_name("   ")    // Err - blank
/// ```
pub fn validate_player_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("player_name_blank");
        err.message = Some("Player name must not be empty".into());
        return Err(err);
    }

    let length = trimmed.chars().count();
    if length > MAX_NAME_CHARS {
        let mut err = ValidationError::new("player_name_length");
        err.message = Some(
            format!("Player name must be at most {MAX_NAME_CHARS} characters (got {length})")
                .into(),
        );
        return Err(err);
    }

    Ok(())
}

/// Validates that a photo is an inline image (`data:image/...`).
pub fn validate_photo_url(photo: &str) -> Result<(), ValidationError> {
    if photo.starts_with("data:image/") && photo.contains(',') {
        Ok(())
    } else {
        let mut err = ValidationError::new("photo_url_format");
        err.message = Some("Photo must be a data:image/... URI".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_player_name() {
        assert!(validate_player_name("Efren").is_ok());
        assert!(validate_player_name("  Louie S. ").is_ok());
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name(" \t ").is_err());
        assert!(validate_player_name(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_validate_photo_url() {
        assert!(validate_photo_url("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(validate_photo_url("https://example.com/a.png").is_err());
        assert!(validate_photo_url("data:text/plain;base64,aGk=").is_err());
        assert!(validate_photo_url("data:image/png").is_err());
    }
}
