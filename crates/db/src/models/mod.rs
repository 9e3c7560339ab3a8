//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (`Option` / `FieldUpdate` fields) for patches

use validator::ValidationError;

pub mod branch;
pub mod issue;
pub mod report_configuration;
pub mod spare_part;
pub mod user;

/// Trim an optional string and drop it when nothing is left.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Reject strings that are empty once trimmed.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message("must not be empty".into()))
    } else {
        Ok(())
    }
}

/// Accept an empty string or an absolute http(s) URL.
pub fn blank_or_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    let is_url = ["http://", "https://"].iter().any(|scheme| {
        value
            .strip_prefix(scheme)
            .is_some_and(|rest| !rest.is_empty() && !rest.contains(char::is_whitespace))
    });
    if value.is_empty() || is_url {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message("must be a valid URL".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_blank_drops_whitespace() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" T-1 ".into())), Some("T-1".into()));
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn not_blank_rejects_whitespace() {
        assert!(not_blank("").is_err());
        assert!(not_blank(" \t\n").is_err());
        assert!(not_blank(" PSU ").is_ok());
    }

    #[test]
    fn blank_or_url_accepts_empty() {
        assert!(blank_or_url("").is_ok());
        assert!(blank_or_url("https://example.com/a.png").is_ok());
        assert!(blank_or_url("not a url").is_err());
    }
}
