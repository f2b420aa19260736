//! Feedback submission validation.

use crate::validate::{validate_email, validate_length};
use crate::{Error, Result};

/// Lowest accepted rating.
pub const MIN_RATING: i32 = 1;

/// Highest accepted rating.
pub const MAX_RATING: i32 = 5;

/// Maximum length of the submitter name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum length of the free-text description, in characters.
pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// Content types accepted for screenshot uploads.
pub const ALLOWED_SCREENSHOT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg", "image/gif"];

/// Extension used when the uploaded filename has none.
pub const DEFAULT_SCREENSHOT_EXTENSION: &str = "png";

/// A public feedback submission, before it reaches storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedbackSubmission {
    pub name: String,
    pub email: String,
    pub rating: i32,
    pub description: Option<String>,
}

impl FeedbackSubmission {
    /// Validate every field.
    pub fn validate(&self) -> Result<()> {
        validate_length("name", &self.name, 1, MAX_NAME_LEN)?;
        validate_email("email", &self.email)?;
        validate_rating(self.rating)?;
        if let Some(description) = &self.description {
            validate_length("description", description, 0, MAX_DESCRIPTION_LEN)?;
        }
        Ok(())
    }
}

/// Check the rating bounds.
pub fn validate_rating(rating: i32) -> Result<()> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(Error::Validation(format!(
            "Rating must be between {MIN_RATING} and {MAX_RATING}"
        )));
    }
    Ok(())
}

/// Parse a rating form value and check its bounds.
pub fn parse_rating(raw: &str) -> Result<i32> {
    let rating: i32 = raw
        .trim()
        .parse()
        .map_err(|_| Error::Validation("rating must be an integer".to_string()))?;
    validate_rating(rating)?;
    Ok(rating)
}

/// Whether a screenshot content type is on the allow-list.
///
/// Parameters such as `; charset=...` are ignored and the comparison is
/// case-insensitive.
pub fn is_allowed_screenshot_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_SCREENSHOT_TYPES.contains(&essence.as_str())
}

/// Derive the storage extension from an uploaded filename.
///
/// Falls back to `png` when there is no extension or it is not purely
/// alphanumeric, so the storage key can never escape its folder.
pub fn screenshot_extension(filename: Option<&str>) -> String {
    filename
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext)
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_SCREENSHOT_EXTENSION.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(rating: i32) -> FeedbackSubmission {
        FeedbackSubmission {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            rating,
            description: Some("Quick and friendly support".to_string()),
        }
    }

    #[test]
    fn test_rating_bounds() {
        for rating in 1..=5 {
            submission(rating).validate().unwrap();
        }
        for rating in [i32::MIN, -1, 0, 6, 10, i32::MAX] {
            let err = submission(rating).validate().unwrap_err();
            assert_eq!(err.to_string(), "Rating must be between 1 and 5");
        }
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!(parse_rating("4").unwrap(), 4);
        assert_eq!(parse_rating(" 5 ").unwrap(), 5);
        assert!(parse_rating("0").is_err());
        assert!(parse_rating("6").is_err());
        assert!(parse_rating("4.5").is_err());
        assert!(parse_rating("five").is_err());
        assert!(parse_rating("").is_err());
    }

    #[test]
    fn test_name_and_description_limits() {
        let mut s = submission(3);
        s.name = String::new();
        assert!(s.validate().is_err());

        s.name = "n".repeat(MAX_NAME_LEN);
        s.validate().unwrap();
        s.name = "n".repeat(MAX_NAME_LEN + 1);
        assert!(s.validate().is_err());

        let mut s = submission(3);
        s.description = Some("d".repeat(MAX_DESCRIPTION_LEN));
        s.validate().unwrap();
        s.description = Some("d".repeat(MAX_DESCRIPTION_LEN + 1));
        assert!(s.validate().is_err());
        s.description = None;
        s.validate().unwrap();
    }

    #[test]
    fn test_email_is_checked() {
        let mut s = submission(3);
        s.email = "not-an-email".to_string();
        assert!(s.validate().is_err());
    }

    #[test]
    fn test_screenshot_type_allow_list() {
        assert!(is_allowed_screenshot_type("image/png"));
        assert!(is_allowed_screenshot_type("image/jpeg"));
        assert!(is_allowed_screenshot_type("image/jpg"));
        assert!(is_allowed_screenshot_type("image/gif"));
        assert!(is_allowed_screenshot_type("IMAGE/PNG; name=shot"));
        assert!(!is_allowed_screenshot_type("application/pdf"));
        assert!(!is_allowed_screenshot_type("image/svg+xml"));
        assert!(!is_allowed_screenshot_type(""));
    }

    #[test]
    fn test_screenshot_extension() {
        assert_eq!(screenshot_extension(Some("shot.PNG")), "png");
        assert_eq!(screenshot_extension(Some("archive.tar.gif")), "gif");
        assert_eq!(screenshot_extension(Some("noext")), "png");
        assert_eq!(screenshot_extension(Some("trailing.")), "png");
        assert_eq!(screenshot_extension(Some("evil.png/../x")), "png");
        assert_eq!(screenshot_extension(None), "png");
    }
}
