//! Remote catalog identifier parsing and validation
//!
//! A [`TemplateId`] names one catalog entry in the search marketplace's
//! namespace. It is opaque to the batch engine: the only requirement is that
//! it is a non-empty token without embedded whitespace.

use std::fmt;

/// Identifier of one catalog item in the remote marketplace
///
/// Surrounding whitespace is trimmed on parse.
///
/// # Examples
///
/// ```
/// use skin_arbitrage::identifier::TemplateId;
///
/// let id = TemplateId::parse(" 44172 ").unwrap();
/// assert_eq!(id.as_str(), "44172");
/// assert_eq!(id.to_string(), "44172");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplateId(String);

impl TemplateId {
    /// Parse an identifier from user or file input
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty or contains whitespace.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdentifierError::InvalidFormat(format!(
                "identifier '{trimmed}' must not contain whitespace"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow the identifier as sent on the wire
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for TemplateId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur during identifier parsing
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// Blank input
    #[error("identifier cannot be empty")]
    Empty,

    /// Invalid identifier format
    #[error("identifier error: {0}")]
    InvalidFormat(String),
}

/// Parse a newline-separated identifier list
///
/// Blank lines and lines starting with `#` are skipped. Order is preserved.
pub fn parse_identifier_list(input: &str) -> Result<Vec<TemplateId>, IdentifierError> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(TemplateId::parse)
        .collect()
}
