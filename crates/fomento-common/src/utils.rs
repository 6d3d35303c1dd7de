//! Utility functions for Fomento
//!
//! Common helper functions used across the codebase.

use std::sync::LazyLock;

/// Regex pattern for validating email addresses
static EMAIL_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$")
        .expect("Invalid regex pattern")
});

/// Validate an email address
///
/// # Examples
///
/// ```
/// use fomento_common::is_valid_email;
///
/// assert!(is_valid_email("founder@startup.com.br"));
/// assert!(!is_valid_email("not-an-email"));
/// ```
pub fn is_valid_email(str: &str) -> bool {
    EMAIL_PATTERN.is_match(str)
}

/// Collapse runs of whitespace (including newlines) into single spaces
/// and trim the result. Used to normalize scraped page text.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("maria@fapesp.br"));
        assert!(is_valid_email("joao.silva+tag@gov.br"));
        assert!(!is_valid_email("joao.silva"));
        assert!(!is_valid_email("@gov.br"));
        assert!(!is_valid_email("a b@gov.br"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(
            collapse_whitespace("  Edital\n\n n. 1/2024   aberto \t agora "),
            "Edital n. 1/2024 aberto agora"
        );
        assert_eq!(collapse_whitespace(""), "");
    }
}
