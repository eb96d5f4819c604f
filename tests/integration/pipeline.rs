//! Price list to final report, with a scripted search upstream

use crate::common::{listing_body, ScriptedExecutor};
use skin_arbitrage::catalog::TemplateCatalog;
use skin_arbitrage::fetcher::waxpeer::PriceListItem;
use skin_arbitrage::fetcher::SearchResponse;
use skin_arbitrage::output::csv::{write_price_rows, write_remote_prices, write_report};
use skin_arbitrage::output::OutputPaths;
use skin_arbitrage::report::{
    build_price_rows, join_report, remote_prices, unique_identifiers, PriceFilter,
};
use skin_arbitrage::run_batch;
use tempfile::tempdir;

const LOOKUP: &str = r#"{
    "AK-47 | Slate (Field-Tested)": 553370,
    "★ Karambit | Doppler (Factory New)": 44172,
    "StatTrak™ M4A4 | Neo-Noir (Minimal Wear)": 7001,
    "P250 | Sand Dune (Field-Tested)": 12,
    "Glock-18 | Vogue (Factory New)": 8080,
    "AWP | Mortis (Minimal Wear)": -1
}"#;

fn item(name: &str, min: i64) -> PriceListItem {
    PriceListItem {
        name: name.to_string(),
        min,
    }
}

#[tokio::test(start_paused = true)]
async fn test_scan_pipeline_writes_joined_report() {
    let catalog = TemplateCatalog::from_json_str(LOOKUP).unwrap();
    let items = vec![
        item("AK-47 | Slate (Field-Tested)", 2_450),
        item("★ Karambit | Doppler Phase 4 (Factory New)", 812_000),
        item("StatTrak™ M4A4 | Neo-Noir (Minimal Wear)", 25_000),
        item("P250 | Sand Dune (Field-Tested)", 30),
        item("Glock-18 | Vogue (Factory New)", 9_990),
        item("AWP | Mortis (Minimal Wear)", 6_000),
        item("Not In Lookup", 5_000),
    ];

    let rows = PriceFilter::default().apply(build_price_rows(items, &catalog));
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "AK-47 | Slate (Field-Tested)",
            "★ Karambit | Doppler (Factory New)",
            "Glock-18 | Vogue (Factory New)"
        ]
    );

    let executor = ScriptedExecutor::always_listing("19.5")
        .script("44172", vec![SearchResponse::Ok(listing_body("Karambit", "5100"))])
        .script("8080", vec![SearchResponse::Fatal(404)])
        .shared();

    let identifiers = unique_identifiers(&rows);
    let results = run_batch(executor, &identifiers, 100).await;
    assert_eq!(results.len(), 3);

    let dir = tempdir().unwrap();
    let paths = OutputPaths::new(dir.path());
    write_price_rows(paths.price_list(), &rows).unwrap();
    write_remote_prices(paths.remote_prices(), &remote_prices(&results)).unwrap();
    let report = join_report(&rows, &results, None);
    write_report(paths.report(), &report).unwrap();

    let final_csv = std::fs::read_to_string(paths.report()).unwrap();
    assert_eq!(
        final_csv,
        "name,usd_price,id,rmb_price\n\
         AK-47 | Slate (Field-Tested),2.45,553370,19.5\n\
         ★ Karambit | Doppler (Factory New),812,44172,5100\n"
    );

    let remote_csv = std::fs::read_to_string(paths.remote_prices()).unwrap();
    let mut remote_lines: Vec<&str> = remote_csv.lines().skip(1).collect();
    remote_lines.sort_unstable();
    assert_eq!(remote_lines, vec!["44172,5100", "553370,19.5"]);

    let price_csv = std::fs::read_to_string(paths.price_list()).unwrap();
    assert!(price_csv.starts_with("name,usd_price,id\n"));
    assert_eq!(price_csv.lines().count(), 4);
}
