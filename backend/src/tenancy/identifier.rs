//! Database identifier extraction for the setup form.

use std::sync::OnceLock;

use regex::Regex;

use crate::errors::AppError;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12}")
            .expect("database id pattern should compile")
    })
}

/// Extract the 32-digit database id from a raw id or a full Notion URL.
///
/// Query strings are ignored so a `?v=<view id>` suffix never wins over the
/// database id in the path. The last match in the path is used because page
/// slugs put the id after the title. Returns lowercase hex without dashes.
pub fn extract_database_id(input: &str) -> Result<String, AppError> {
    let trimmed = input.trim();
    let path = trimmed.split(['?', '#']).next().unwrap_or_default();

    id_pattern()
        .find_iter(path)
        .last()
        .map(|m| m.as_str().replace('-', "").to_ascii_lowercase())
        .ok_or_else(|| AppError::InvalidIdentifierFormat(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "1d1fbe500a9e806caf47c677171307ec";

    #[test]
    fn test_raw_id_passes_through() {
        assert_eq!(extract_database_id(ID).unwrap(), ID);
        assert_eq!(extract_database_id(&format!("  {}  ", ID)).unwrap(), ID);
    }

    #[test]
    fn test_url_with_view_query() {
        let url = format!(
            "https://www.notion.so/acme/Classes-{}?v=2a2fbe500a9e80aaaf47c677171307ff",
            ID
        );
        assert_eq!(extract_database_id(&url).unwrap(), ID);
    }

    #[test]
    fn test_dashed_uuid_is_canonicalised() {
        let dashed = "1D1FBE50-0A9E-806C-AF47-C677171307EC";
        assert_eq!(extract_database_id(dashed).unwrap(), ID);
    }

    #[test]
    fn test_invalid_input() {
        let err = extract_database_id("https://www.notion.so/acme/Classes").unwrap_err();
        assert!(matches!(err, AppError::InvalidIdentifierFormat(_)));
        assert!(extract_database_id("").is_err());
        assert!(extract_database_id("1d1fbe500a9e").is_err());
    }
}
