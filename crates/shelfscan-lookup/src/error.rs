use thiserror::Error;

/// Errors returned by a single source adapter query.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The source answered but does not know this identifier. An
    /// ordinary outcome, absorbed by the fan-out.
    #[error("product {identifier} not found in {source_tag}")]
    NotFound {
        source_tag: &'static str,
        identifier: String,
    },

    /// Non-2xx response that is neither a clean not-found nor a
    /// transport failure.
    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The per-source deadline elapsed before the adapter answered.
    #[error("{source_tag} did not answer within {timeout_ms}ms")]
    Timeout {
        source_tag: &'static str,
        timeout_ms: u64,
    },
}

/// Errors surfaced by [`crate::Resolver::resolve`] to its caller.
///
/// `NotFound` and `RateLimited` are deliberately distinct: one means
/// "this does not exist", the other means "try again later".
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No configured source produced any data for the identifier.
    #[error("product {identifier} not found in any source")]
    NotFound { identifier: String },

    /// The outbound rate governor rejected the operation.
    #[error("lookup rate limit exceeded for caller {caller}")]
    RateLimited { caller: String },
}
