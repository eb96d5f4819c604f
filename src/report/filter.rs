//! Price band and keyword filtering

use rust_decimal::Decimal;

use super::PriceRow;

/// Items outside these wear grades, weapon families and item kinds rarely
/// have enough liquidity on both marketplaces.
pub const DEFAULT_EXCLUDED_KEYWORDS: [&str; 13] = [
    "Well-Worn",
    "Battle-Scarred",
    "StatTrak",
    "Sticker",
    "Sealed Graffiti",
    "G3SG1",
    "Souvenir",
    "XM1014",
    "MAG-7",
    "CZ75-Auto",
    "PP-Bizon",
    "Patch",
    "SCAR-20",
];

/// Row predicate on USD price and item name
#[derive(Debug, Clone, PartialEq)]
pub struct PriceFilter {
    /// Exclusive lower bound in USD
    pub min_price: Decimal,
    /// Exclusive upper bound in USD
    pub max_price: Decimal,
    /// Case-insensitive substrings that exclude a row
    pub exclude: Vec<String>,
}

impl Default for PriceFilter {
    fn default() -> Self {
        Self {
            min_price: Decimal::from(2),
            max_price: Decimal::from(1_000),
            exclude: DEFAULT_EXCLUDED_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl PriceFilter {
    /// Create a filter with an explicit band and keyword list
    pub fn new(min_price: Decimal, max_price: Decimal, exclude: Vec<String>) -> Self {
        Self {
            min_price,
            max_price,
            exclude,
        }
    }

    /// Whether a row passes
    pub fn matches(&self, row: &PriceRow) -> bool {
        if row.usd_price <= self.min_price || row.usd_price >= self.max_price {
            return false;
        }
        let name = row.name.to_lowercase();
        !self
            .exclude
            .iter()
            .any(|word| name.contains(&word.to_lowercase()))
    }

    /// Keep the rows that pass, in order
    pub fn apply(&self, rows: Vec<PriceRow>) -> Vec<PriceRow> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}
