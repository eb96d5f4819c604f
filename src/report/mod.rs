//! Price list preparation and the final arbitrage join
//!
//! The pipeline around the batch engine:
//!
//! 1. [`build_price_rows`] maps the bulk price list onto template ids
//! 2. [`filter::PriceFilter`] keeps the price band and drops excluded keywords
//! 3. [`join::join_report`] inner-joins the remaining rows with the batch results

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::debug;

use crate::catalog::{normalize_name, TemplateCatalog};
use crate::fetcher::waxpeer::PriceListItem;
use crate::identifier::TemplateId;

pub mod filter;
pub mod join;

pub use filter::PriceFilter;
pub use join::{join_report, remote_prices, ArbitrageRow, RemotePriceRow};

/// Price-list units per US dollar
const PRICE_LIST_UNITS_PER_USD: i64 = 1_000;

/// One price-list item that maps to a remote identifier
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    /// Normalized market name
    pub name: String,
    /// Lowest ask in USD, rounded to cents
    pub usd_price: Decimal,
    /// Remote identifier
    pub id: TemplateId,
}

/// Convert price-list units (1/1000 USD) to dollars rounded to cents
///
/// Trailing zeros are dropped, so whole-dollar prices print without a
/// fractional part.
///
/// ```
/// use rust_decimal::Decimal;
/// use skin_arbitrage::report::to_usd;
///
/// assert_eq!(to_usd(12_346), Decimal::new(1235, 2));
/// ```
pub fn to_usd(min: i64) -> Decimal {
    (Decimal::from(min) / Decimal::from(PRICE_LIST_UNITS_PER_USD))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
        .normalize()
}

/// Convert a price into another currency at `rate` units per source unit
pub fn convert_price(price: Decimal, rate: Decimal) -> Decimal {
    (price * rate).round_dp(2)
}

/// Normalize names, resolve identifiers and convert prices
///
/// Items whose name has no mapped identifier are dropped. Input order is
/// preserved.
pub fn build_price_rows(items: Vec<PriceListItem>, catalog: &TemplateCatalog) -> Vec<PriceRow> {
    let total = items.len();
    let rows: Vec<PriceRow> = items
        .into_iter()
        .filter_map(|item| {
            let name = normalize_name(&item.name);
            let id = catalog.lookup(&name)?;
            Some(PriceRow {
                usd_price: to_usd(item.min),
                name,
                id,
            })
        })
        .collect();

    debug!(items = total, mapped = rows.len(), "Price list mapped to identifiers");
    rows
}

/// Identifiers to query, in price-list order, without repeats
pub fn unique_identifiers(rows: &[PriceRow]) -> Vec<TemplateId> {
    let mut seen = std::collections::HashSet::with_capacity(rows.len());
    rows.iter()
        .filter(|row| seen.insert(&row.id))
        .map(|row| row.id.clone())
        .collect()
}
