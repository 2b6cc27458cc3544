//! Price comparison and trend command handlers.

use std::collections::BTreeMap;

use chrono::Utc;

use shelfscan_compare::{analyze_trend, rank_trending, CompareConfig, TrendDirection};
use shelfscan_core::{CanonicalProduct, PriceHistoryEntry};

use crate::lookup::resolve_identifier;

const CALLER_KEY: &str = "cli";

/// Search the selected retailers and print the ranked comparison report.
///
/// When `identifier` is given the product is resolved through the
/// lookup sources first; otherwise `name` (and optionally `brand`)
/// describe it directly.
///
/// # Errors
///
/// Returns an error if neither an identifier nor a name is given, or
/// if configuration or the search itself fails.
pub(crate) async fn run_compare(
    name: Option<&str>,
    brand: Option<&str>,
    identifier: Option<&str>,
    retailers: Vec<String>,
    max_results: Option<usize>,
) -> anyhow::Result<()> {
    let product = match (identifier, name) {
        (Some(id), _) => resolve_identifier(id).await?,
        (None, Some(name)) => CanonicalProduct {
            name: Some(name.to_owned()),
            brand: brand.map(str::to_owned),
            ..CanonicalProduct::default()
        },
        (None, None) => anyhow::bail!("pass --identifier or --name to describe the product"),
    };

    let config = CompareConfig::from_env().map_err(anyhow::Error::msg)?;
    let comparer = config.comparer()?;
    let retailers = if retailers.is_empty() {
        config
            .registry()?
            .keys()
            .into_iter()
            .map(str::to_owned)
            .collect()
    } else {
        retailers
    };

    let report = comparer
        .compare(CALLER_KEY, &product, &retailers, max_results)
        .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Analyze one product's price history from a JSON file and print the
/// trend report.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub(crate) fn run_trend(path: &str, days: i64) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let history: Vec<PriceHistoryEntry> = serde_json::from_str(&raw)?;
    let report = analyze_trend(&history, days, Utc::now());
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Rank keyed price histories from a JSON file by movement over the
/// window and print the ranking.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub(crate) fn run_trending(path: &str, days: i64, rises: bool) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(path)?;
    let histories: BTreeMap<String, Vec<PriceHistoryEntry>> = serde_json::from_str(&raw)?;
    let histories: Vec<(String, Vec<PriceHistoryEntry>)> = histories.into_iter().collect();

    let direction = if rises {
        TrendDirection::BiggestRises
    } else {
        TrendDirection::BiggestDrops
    };
    let ranking = rank_trending(&histories, days, Utc::now(), direction);
    println!("{}", serde_json::to_string_pretty(&ranking)?);
    Ok(())
}
