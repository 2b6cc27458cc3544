//! Price history trend analysis.
//!
//! Pure reductions over time-ordered price histories: single-product
//! trend classification with window statistics, and cross-product
//! trending ranks by first-to-last delta.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use shelfscan_core::PriceHistoryEntry;

/// Percentage-change magnitude below which a history counts as stable.
const STABLE_THRESHOLD_PCT: f64 = 2.0;

/// Direction of a price series over the analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTrend {
    Increasing,
    Decreasing,
    Stable,
}

/// Outcome of analyzing one product's history window.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendReport {
    /// Fewer than two points fell inside the window.
    InsufficientData,
    Analyzed {
        trend: PriceTrend,
        /// First-to-last change over the window, in percent.
        change_percent: f64,
        min: f64,
        max: f64,
        mean: f64,
    },
}

/// Sort order for [`rank_trending`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    /// Largest price drops first (most negative delta).
    BiggestDrops,
    /// Largest price rises first.
    BiggestRises,
}

/// One product's delta in a trending ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingEntry {
    /// Caller-supplied product key.
    pub key: String,
    /// First-to-last change over the window, in percent.
    pub change_percent: f64,
}

/// Analyzes the last `window_days` of a time-ordered price history.
///
/// The caller guarantees `history` is ordered by `observed_at`
/// ascending; the engine only reads it. Entries older than the window
/// are ignored. Classification is by first-to-last percentage change:
/// within ±2% is stable, otherwise the sign decides.
#[must_use]
pub fn analyze_trend(
    history: &[PriceHistoryEntry],
    window_days: i64,
    now: DateTime<Utc>,
) -> TrendReport {
    let prices = windowed_prices(history, window_days, now);
    let Some(change_percent) = first_to_last_change(&prices) else {
        return TrendReport::InsufficientData;
    };

    let trend = if change_percent.abs() < STABLE_THRESHOLD_PCT {
        PriceTrend::Stable
    } else if change_percent > 0.0 {
        PriceTrend::Increasing
    } else {
        PriceTrend::Decreasing
    };

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    #[allow(clippy::cast_precision_loss)]
    let mean = prices.iter().sum::<f64>() / prices.len() as f64;

    TrendReport::Analyzed {
        trend,
        change_percent,
        min,
        max,
        mean,
    }
}

/// Ranks products by their first-to-last delta over the window.
///
/// Products with insufficient in-window history are skipped.
/// `BiggestDrops` sorts ascending (most negative change first),
/// `BiggestRises` descending.
#[must_use]
pub fn rank_trending(
    histories: &[(String, Vec<PriceHistoryEntry>)],
    window_days: i64,
    now: DateTime<Utc>,
    direction: TrendDirection,
) -> Vec<TrendingEntry> {
    let mut entries: Vec<TrendingEntry> = histories
        .iter()
        .filter_map(|(key, history)| {
            let prices = windowed_prices(history, window_days, now);
            first_to_last_change(&prices).map(|change_percent| TrendingEntry {
                key: key.clone(),
                change_percent,
            })
        })
        .collect();

    entries.sort_by(|a, b| match direction {
        TrendDirection::BiggestDrops => a.change_percent.total_cmp(&b.change_percent),
        TrendDirection::BiggestRises => b.change_percent.total_cmp(&a.change_percent),
    });

    entries
}

fn windowed_prices(history: &[PriceHistoryEntry], window_days: i64, now: DateTime<Utc>) -> Vec<f64> {
    let cutoff = now - Duration::days(window_days);
    history
        .iter()
        .filter(|entry| entry.observed_at >= cutoff)
        .map(|entry| entry.price)
        .collect()
}

/// Percentage change from the first to the last price, or `None` when
/// fewer than two points exist or the first price is zero.
fn first_to_last_change(prices: &[f64]) -> Option<f64> {
    let (first, last) = match (prices.first(), prices.last()) {
        (Some(&first), Some(&last)) if prices.len() >= 2 => (first, last),
        _ => return None,
    };
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}
