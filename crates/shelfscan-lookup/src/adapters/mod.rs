//! Source adapters: one per external product database.
//!
//! Each adapter is a capability behind [`SourceAdapter`], constructed
//! from configuration and handed to the resolver as a list — never
//! looked up from process globals. Adapters own their retry policy;
//! the fan-out layer treats them as single fallible calls.

mod barcode_lookup;
mod open_food_facts;
mod upc_item_db;

pub use barcode_lookup::BarcodeLookupAdapter;
pub use open_food_facts::OpenFoodFactsAdapter;
pub use upc_item_db::UpcItemDbAdapter;

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;

use shelfscan_core::SourceRecord;

use crate::error::LookupError;

const USER_AGENT: &str = "shelfscan/0.1 (product-lookup)";

/// One external product database, queried by identifier.
///
/// Implementations declare a stable `source_tag` used in merged output,
/// logs, and the source-priority ordering.
pub trait SourceAdapter: Send + Sync {
    /// Stable tag of this source, e.g. `"open_food_facts"`.
    fn source_tag(&self) -> &'static str;

    /// Queries the source for one identifier.
    ///
    /// [`LookupError::NotFound`] means the source answered and does not
    /// know the identifier; every other error is a failure of this one
    /// call. Either way the fan-out absorbs it.
    fn query<'a>(&'a self, identifier: &'a str)
        -> BoxFuture<'a, Result<SourceRecord, LookupError>>;
}

/// Builds the HTTP client shared shape for all adapters.
pub(crate) fn build_client(timeout_secs: u64) -> Result<Client, LookupError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .build()?;
    Ok(client)
}

/// Performs a GET and returns the body as JSON.
///
/// 404 is mapped to [`LookupError::NotFound`]; any other non-2xx status
/// to [`LookupError::UnexpectedStatus`] so the retry policy can tell
/// throttling/5xx apart from hard failures.
pub(crate) async fn request_json(
    client: &Client,
    url: &str,
    source_tag: &'static str,
    identifier: &str,
) -> Result<serde_json::Value, LookupError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(LookupError::NotFound {
            source_tag,
            identifier: identifier.to_owned(),
        });
    }
    if !status.is_success() {
        return Err(LookupError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }
    let body = response.json().await?;
    Ok(body)
}

/// Collapses `Some("")` to `None` so the merger never sees a present but
/// empty field.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
