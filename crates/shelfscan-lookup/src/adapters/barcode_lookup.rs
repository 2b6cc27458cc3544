//! Barcode Lookup API (key-gated commercial database).

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::Deserialize;

use shelfscan_core::{ImageRef, ProductIdentifier, SourceRecord};

use crate::adapters::{build_client, non_empty, request_json, SourceAdapter};
use crate::error::LookupError;
use crate::retry::retry_with_backoff;

const SOURCE_TAG: &str = "barcode_lookup";

/// Adapter for the Barcode Lookup API.
///
/// The only adapter that carries pricing: the first store price found in
/// a product's store list becomes the record's suggested price. Requires
/// an API key, so configuration only builds this adapter when both the
/// endpoint URL and key are present.
pub struct BarcodeLookupAdapter {
    client: Client,
    endpoint: String,
    api_key: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    products: Vec<LookupProduct>,
}

#[derive(Debug, Deserialize)]
struct LookupProduct {
    title: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    description: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    barcode_number: Option<String>,
    #[serde(default)]
    stores: Vec<StoreOffer>,
}

#[derive(Debug, Deserialize)]
struct StoreOffer {
    price: Option<String>,
    #[allow(dead_code)]
    store_name: Option<String>,
}

impl BarcodeLookupAdapter {
    /// Creates an adapter for the given endpoint and API key.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
        api_key: &str,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    async fn lookup_once(&self, identifier: &str) -> Result<SourceRecord, LookupError> {
        let url = format!(
            "{}?formatted=y&code={identifier}&key={}",
            self.endpoint, self.api_key
        );
        let body = request_json(&self.client, &url, SOURCE_TAG, identifier).await?;

        let response: LookupResponse =
            serde_json::from_value(body).map_err(|e| LookupError::Deserialize {
                context: format!("barcode_lookup products({identifier})"),
                source: e,
            })?;

        let Some(product) = response.products.into_iter().next() else {
            return Err(LookupError::NotFound {
                source_tag: SOURCE_TAG,
                identifier: identifier.to_owned(),
            });
        };

        let suggested_price = first_store_price(&product.stores);

        let images = product
            .images
            .into_iter()
            .map(|url| ImageRef {
                url,
                is_primary: false,
            })
            .collect();

        let identifiers = non_empty(product.barcode_number)
            .map(|value| ProductIdentifier {
                kind: "upc".to_owned(),
                value,
            })
            .into_iter()
            .collect();

        Ok(SourceRecord {
            name: non_empty(product.title),
            brand: non_empty(product.brand),
            category: non_empty(product.category),
            description: non_empty(product.description),
            images,
            identifiers,
            suggested_price,
            source_tag: SOURCE_TAG.to_owned(),
        })
    }
}

/// First parseable store price, if any. Store order is the API's own.
fn first_store_price(stores: &[StoreOffer]) -> Option<f64> {
    stores
        .iter()
        .filter_map(|store| store.price.as_deref())
        .find_map(|price| price.trim().parse::<f64>().ok())
}

impl SourceAdapter for BarcodeLookupAdapter {
    fn source_tag(&self) -> &'static str {
        SOURCE_TAG
    }

    fn query<'a>(
        &'a self,
        identifier: &'a str,
    ) -> BoxFuture<'a, Result<SourceRecord, LookupError>> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, move || {
            self.lookup_once(identifier)
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(price: Option<&str>) -> StoreOffer {
        StoreOffer {
            price: price.map(str::to_owned),
            store_name: None,
        }
    }

    #[test]
    fn first_parseable_store_price_wins() {
        let stores = vec![offer(None), offer(Some("not a price")), offer(Some("12.99"))];
        assert_eq!(first_store_price(&stores), Some(12.99));
    }

    #[test]
    fn no_stores_means_no_price() {
        assert_eq!(first_store_price(&[]), None);
    }
}
