use thiserror::Error;

/// Errors from retailer searches and price comparison.
#[derive(Debug, Error)]
pub enum CompareError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from a retailer search page.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The per-retailer deadline elapsed before the scraper answered.
    #[error("{retailer} search did not answer within {timeout_ms}ms")]
    Timeout { retailer: String, timeout_ms: u64 },

    /// The outbound rate governor rejected the operation. Distinct from
    /// an empty result: this one means "try again later".
    #[error("search rate limit exceeded for caller {caller}")]
    RateLimited { caller: String },
}
