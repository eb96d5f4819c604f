//! Final report join

use rust_decimal::Decimal;

use super::{convert_price, PriceRow};
use crate::downloader::ResultSet;
use crate::identifier::TemplateId;

/// Remote price for one identifier, sentinel outcomes removed
#[derive(Debug, Clone, PartialEq)]
pub struct RemotePriceRow {
    /// Remote identifier
    pub id: TemplateId,
    /// Cheapest listing on the search marketplace (CNY)
    pub rmb_price: Decimal,
}

/// One item priced on both marketplaces
#[derive(Debug, Clone, PartialEq)]
pub struct ArbitrageRow {
    /// Normalized market name
    pub name: String,
    /// Lowest ask on the price-list marketplace
    pub usd_price: Decimal,
    /// Remote identifier
    pub id: TemplateId,
    /// Cheapest listing on the search marketplace
    pub rmb_price: Decimal,
    /// `usd_price` converted at the configured exchange rate
    pub local_price: Option<Decimal>,
}

/// Successful outcomes as report rows, in result-set order
pub fn remote_prices(results: &ResultSet) -> Vec<RemotePriceRow> {
    results
        .priced()
        .map(|(id, rmb_price)| RemotePriceRow {
            id: id.clone(),
            rmb_price,
        })
        .collect()
}

/// Inner join of the filtered price list with the batch results on `id`
///
/// Rows keep price-list order. Identifiers that failed (sentinel price) do
/// not appear. `exchange_rate`, when given, fills `local_price`.
pub fn join_report(
    price_rows: &[PriceRow],
    results: &ResultSet,
    exchange_rate: Option<Decimal>,
) -> Vec<ArbitrageRow> {
    let index = results.price_index();

    price_rows
        .iter()
        .filter_map(|row| {
            let rmb_price = *index.get(&row.id)?;
            Some(ArbitrageRow {
                name: row.name.clone(),
                usd_price: row.usd_price,
                id: row.id.clone(),
                rmb_price,
                local_price: exchange_rate.map(|rate| convert_price(row.usd_price, rate)),
            })
        })
        .collect()
}
