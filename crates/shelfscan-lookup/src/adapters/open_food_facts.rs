//! Open Food Facts product endpoint (`/<identifier>.json`).

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::Deserialize;

use shelfscan_core::{ImageRef, ProductIdentifier, SourceRecord};

use crate::adapters::{build_client, non_empty, request_json, SourceAdapter};
use crate::error::LookupError;
use crate::retry::retry_with_backoff;

const DEFAULT_ENDPOINT: &str = "https://world.openfoodfacts.org/api/v0/product";
const SOURCE_TAG: &str = "open_food_facts";

/// Adapter for the Open Food Facts v0 product API.
pub struct OpenFoodFactsAdapter {
    client: Client,
    endpoint: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    status: i64,
    product: Option<OffProduct>,
}

#[derive(Debug, Deserialize)]
struct OffProduct {
    product_name: Option<String>,
    product_name_en: Option<String>,
    brands: Option<String>,
    categories: Option<String>,
    ingredients_text_en: Option<String>,
    image_url: Option<String>,
    code: Option<String>,
}

impl OpenFoodFactsAdapter {
    /// Creates an adapter pointed at the production endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
    ) -> Result<Self, LookupError> {
        Self::with_base_url(timeout_secs, max_retries, backoff_base_ms, DEFAULT_ENDPOINT)
    }

    /// Creates an adapter with a custom endpoint (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`LookupError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn with_base_url(
        timeout_secs: u64,
        max_retries: u32,
        backoff_base_ms: u64,
        base_url: &str,
    ) -> Result<Self, LookupError> {
        Ok(Self {
            client: build_client(timeout_secs)?,
            endpoint: base_url.trim_end_matches('/').to_owned(),
            max_retries,
            backoff_base_ms,
        })
    }

    async fn lookup_once(&self, identifier: &str) -> Result<SourceRecord, LookupError> {
        let url = format!("{}/{identifier}.json", self.endpoint);
        let body = request_json(&self.client, &url, SOURCE_TAG, identifier).await?;

        let response: ProductResponse =
            serde_json::from_value(body).map_err(|e| LookupError::Deserialize {
                context: format!("open_food_facts product({identifier})"),
                source: e,
            })?;

        // status 0 means "unknown product" even with a 200 response.
        let product = (response.status == 1).then_some(response.product).flatten();
        let Some(product) = product else {
            return Err(LookupError::NotFound {
                source_tag: SOURCE_TAG,
                identifier: identifier.to_owned(),
            });
        };

        // Primary name field, with the English-specific one as fallback.
        let name = non_empty(product.product_name).or_else(|| non_empty(product.product_name_en));

        let images = non_empty(product.image_url)
            .map(|url| ImageRef {
                url,
                is_primary: true,
            })
            .into_iter()
            .collect();

        let identifiers = non_empty(product.code)
            .map(|code| ProductIdentifier {
                kind: "barcode".to_owned(),
                value: code,
            })
            .into_iter()
            .collect();

        Ok(SourceRecord {
            name,
            brand: non_empty(product.brands),
            category: non_empty(product.categories),
            description: non_empty(product.ingredients_text_en),
            images,
            identifiers,
            suggested_price: None,
            source_tag: SOURCE_TAG.to_owned(),
        })
    }
}

impl SourceAdapter for OpenFoodFactsAdapter {
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
