//! Price comparison: matching scraped retailer listings against a
//! canonical product, ranking them by price, and analyzing price
//! history trends.
//!
//! Retailers sit behind the [`ListingScraper`] capability trait in a
//! configuration-built [`ScraperRegistry`]; the [`PriceComparer`]
//! searches the selected retailers concurrently, gates out irrelevant
//! listings, and ranks the rest cheapest-first.

pub mod compare;
pub mod config;
pub mod error;
pub mod matching;
pub mod rank;
pub mod scrape;
pub mod trend;

pub use compare::PriceComparer;
pub use config::CompareConfig;
pub use error::CompareError;
pub use matching::{build_search_query, score_listing};
pub use rank::{match_listings, ComparisonReport};
pub use scrape::{AmazonScraper, ListingScraper, ScraperRegistry, WalmartScraper};
pub use trend::{analyze_trend, rank_trending, PriceTrend, TrendDirection, TrendReport};
