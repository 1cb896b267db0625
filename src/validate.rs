//! Title validation applied at the HTTP boundary before anything is persisted.
//!
//! The store trusts its callers; this module is the only place the title
//! rules live. Callers trim surrounding whitespace first.

use regex_lite::Regex;
use std::sync::LazyLock;

/// Maximum title length, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// Letters, digits, space and `. , ! ? _ -`.
static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9 .,!?_-]+$").expect("title pattern is a valid regex")
});

/// The first rule a rejected title broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TitleRejection {
    #[error("title is empty")]
    Empty,
    #[error("title is longer than {} characters", MAX_TITLE_LEN)]
    TooLong,
    #[error("title may only contain letters, digits, spaces and . , ! ? _ -")]
    InvalidCharacters,
}

/// Check a candidate title, reporting the first rule it breaks.
pub fn validate_title(title: &str) -> Result<(), TitleRejection> {
    if title.is_empty() {
        return Err(TitleRejection::Empty);
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(TitleRejection::TooLong);
    }
    if !TITLE_PATTERN.is_match(title) {
        return Err(TitleRejection::InvalidCharacters);
    }
    Ok(())
}

/// Whether a candidate title may be persisted.
pub fn is_valid_title(title: &str) -> bool {
    validate_title(title).is_ok()
}
