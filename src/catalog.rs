//! Name to identifier lookup table
//!
//! The search marketplace identifies items by numeric template ids while the
//! price-list marketplace uses market names. A static JSON table
//! (`{ "<market name>": <id> }`) bridges the two; `-1` marks names known to
//! have no counterpart.

use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use crate::identifier::TemplateId;

/// Marker used in the table for names without a remote counterpart
const UNMAPPED_ID: i64 = -1;

/// Doppler variants are listed per phase/gem on the price-list side but
/// share one name in the lookup table.
const DOPPLER_TOKENS: [&str; 8] = [
    "Phase 1 ",
    "Phase 2 ",
    "Phase 3 ",
    "Phase 4 ",
    "Emerald ",
    "Ruby ",
    "Black Pearl ",
    "Sapphire ",
];

/// Catalog loading errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// IO error
    #[error("IO error: {0}")]
    IoError(String),

    /// Table is not a JSON object of integers
    #[error("parse error: {0}")]
    ParseError(String),
}

/// Align a price-list market name with the lookup table's naming
///
/// ```
/// use skin_arbitrage::catalog::normalize_name;
///
/// assert_eq!(
///     normalize_name("★ Karambit | Doppler Phase 2 (Factory New)"),
///     "★ Karambit | Doppler (Factory New)"
/// );
/// assert_eq!(normalize_name("AK-47 | Redline (Field-Tested)"), "AK-47 | Redline (Field-Tested)");
/// ```
pub fn normalize_name(name: &str) -> String {
    if !name.contains("Doppler") {
        return name.to_string();
    }
    DOPPLER_TOKENS
        .iter()
        .fold(name.to_string(), |acc, token| acc.replace(token, ""))
}

/// Static market-name to template-id table
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    entries: HashMap<String, i64>,
}

impl TemplateCatalog {
    /// Load the table from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::IoError(format!("Failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse the table from JSON text
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let entries: HashMap<String, i64> = serde_json::from_str(raw)
            .map_err(|e| CatalogError::ParseError(format!("Invalid lookup table: {e}")))?;
        debug!(entries = entries.len(), "Lookup table loaded");
        Ok(Self { entries })
    }

    /// Number of names in the table, mapped or not
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Identifier for an already-normalized market name
    ///
    /// Returns `None` for unknown names and names marked unmapped.
    pub fn lookup(&self, name: &str) -> Option<TemplateId> {
        match self.entries.get(name) {
            Some(&id) if id != UNMAPPED_ID => Some(TemplateId::from(id)),
            _ => None,
        }
    }
}

impl FromIterator<(String, i64)> for TemplateCatalog {
    fn from_iter<I: IntoIterator<Item = (String, i64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
