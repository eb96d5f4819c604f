//! Search response parsing
//!
//! Extracts the cheapest listing from a search response body. The response
//! is requested sorted ascending by price, so the first entry of
//! `Data.CommodityList` is the cheapest one. Extraction is a pure function of
//! the body.

use crate::Listing;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

/// Reasons a successful response holds no usable listing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// A required object key is absent or has the wrong type
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// The listing array is present but empty
    #[error("no listings in response")]
    EmptyList,

    /// The price could not be read as a decimal
    #[error("invalid price: {0}")]
    InvalidPrice(String),
}

/// Extract the lowest-priced listing from a search response body
///
/// # Errors
///
/// Returns [`ExtractError`] when the list is missing or empty, or when the
/// first entry lacks a name, price or seller.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use skin_arbitrage::fetcher::youpin_parser::extract_cheapest;
///
/// let body = json!({
///     "Data": { "CommodityList": [
///         { "CommodityName": "AWP | Asiimov (Field-Tested)", "Price": "512.5", "UserNickName": "seller" }
///     ]}
/// });
/// let listing = extract_cheapest(&body).unwrap();
/// assert_eq!(listing.price.to_string(), "512.5");
/// ```
pub fn extract_cheapest(body: &Value) -> Result<Listing, ExtractError> {
    let list = body
        .get("Data")
        .and_then(|data| data.get("CommodityList"))
        .and_then(Value::as_array)
        .ok_or(ExtractError::MissingField("Data.CommodityList"))?;

    let first = list.first().ok_or(ExtractError::EmptyList)?;

    let name = first
        .get("CommodityName")
        .and_then(Value::as_str)
        .ok_or(ExtractError::MissingField("CommodityName"))?;
    let price = parse_price(first.get("Price").ok_or(ExtractError::MissingField("Price"))?)?;
    let seller = first
        .get("UserNickName")
        .and_then(Value::as_str)
        .ok_or(ExtractError::MissingField("UserNickName"))?;

    Ok(Listing {
        name: name.to_string(),
        price,
        seller: seller.to_string(),
    })
}

/// Prices arrive either as decimal strings or JSON numbers
fn parse_price(value: &Value) -> Result<Decimal, ExtractError> {
    let raw = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        other => return Err(ExtractError::InvalidPrice(other.to_string())),
    };

    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|_| ExtractError::InvalidPrice(raw))
}
