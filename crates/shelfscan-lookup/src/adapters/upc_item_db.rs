//! UPCItemDB trial lookup endpoint.

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Client;
use serde::Deserialize;

use shelfscan_core::{ImageRef, ProductIdentifier, SourceRecord};

use crate::adapters::{build_client, non_empty, request_json, SourceAdapter};
use crate::error::LookupError;
use crate::retry::retry_with_backoff;

const DEFAULT_ENDPOINT: &str = "https://api.upcitemdb.com/prod/trial/lookup";
const SOURCE_TAG: &str = "upc_database";

/// Adapter for the UPCItemDB `lookup` endpoint (`?upc=<identifier>`).
pub struct UpcItemDbAdapter {
    client: Client,
    endpoint: String,
    max_retries: u32,
    backoff_base_ms: u64,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    code: String,
    #[serde(default)]
    items: Vec<LookupItem>,
}

#[derive(Debug, Deserialize)]
struct LookupItem {
    title: Option<String>,
    brand: Option<String>,
    category: Option<String>,
    description: Option<String>,
    #[serde(default)]
    images: Vec<String>,
    upc: Option<String>,
    ean: Option<String>,
}

impl UpcItemDbAdapter {
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
        let url = format!("{}?upc={identifier}", self.endpoint);
        let body = request_json(&self.client, &url, SOURCE_TAG, identifier).await?;

        let response: LookupResponse =
            serde_json::from_value(body).map_err(|e| LookupError::Deserialize {
                context: format!("upc_item_db lookup({identifier})"),
                source: e,
            })?;

        let first = (response.code == "OK")
            .then(|| response.items.into_iter().next())
            .flatten();
        let Some(item) = first else {
            return Err(LookupError::NotFound {
                source_tag: SOURCE_TAG,
                identifier: identifier.to_owned(),
            });
        };

        let mut identifiers = Vec::new();
        if let Some(upc) = non_empty(item.upc) {
            identifiers.push(ProductIdentifier {
                kind: "upc".to_owned(),
                value: upc,
            });
        }
        if let Some(ean) = non_empty(item.ean) {
            identifiers.push(ProductIdentifier {
                kind: "ean".to_owned(),
                value: ean,
            });
        }

        let images = item
            .images
            .into_iter()
            .next()
            .map(|url| ImageRef {
                url,
                is_primary: true,
            })
            .into_iter()
            .collect();

        Ok(SourceRecord {
            name: non_empty(item.title),
            brand: non_empty(item.brand),
            category: non_empty(item.category),
            description: non_empty(item.description),
            images,
            identifiers,
            suggested_price: None,
            source_tag: SOURCE_TAG.to_owned(),
        })
    }
}

impl SourceAdapter for UpcItemDbAdapter {
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
