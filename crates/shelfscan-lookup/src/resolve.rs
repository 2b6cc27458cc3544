//! Concurrent source fan-out and product resolution.

use std::time::Duration;

use futures::future::join_all;

use shelfscan_core::{CanonicalProduct, RateGovernor, SourceRecord};

use crate::adapters::SourceAdapter;
use crate::error::{LookupError, ResolveError};
use crate::merge::merge_records;

/// Queries every adapter concurrently, each call bounded by
/// `per_source_timeout`, and returns one `(source_tag, outcome)` pair per
/// adapter in adapter order.
///
/// This is the bare gather: nothing is retried here and no failure is
/// dropped, so callers decide how to fold partial failure into a
/// verdict. Sibling calls are unaffected by one source timing out.
pub async fn query_all(
    adapters: &[Box<dyn SourceAdapter>],
    identifier: &str,
    per_source_timeout: Duration,
) -> Vec<(&'static str, Result<SourceRecord, LookupError>)> {
    let timeout_ms = u64::try_from(per_source_timeout.as_millis()).unwrap_or(u64::MAX);
    let queries = adapters.iter().map(|adapter| {
        let tag = adapter.source_tag();
        async move {
            let outcome = match tokio::time::timeout(per_source_timeout, adapter.query(identifier))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(LookupError::Timeout {
                    source_tag: tag,
                    timeout_ms,
                }),
            };
            (tag, outcome)
        }
    });
    join_all(queries).await
}

/// Resolves identifiers into canonical products by fanning out to the
/// configured source adapters and merging whatever answers.
///
/// Adapter slice order is the source-priority order used by the merger.
/// The operation succeeds as long as at least one source produces data;
/// it fails with [`ResolveError::NotFound`] only when every source
/// failed, timed out, or answered empty.
pub struct Resolver {
    adapters: Vec<Box<dyn SourceAdapter>>,
    governor: RateGovernor,
    per_source_timeout: Duration,
    overall_deadline: Duration,
}

impl Resolver {
    /// Creates a resolver over `adapters`, listed in source-priority order.
    #[must_use]
    pub fn new(
        adapters: Vec<Box<dyn SourceAdapter>>,
        governor: RateGovernor,
        per_source_timeout: Duration,
        overall_deadline: Duration,
    ) -> Self {
        Self {
            adapters,
            governor,
            per_source_timeout,
            overall_deadline,
        }
    }

    /// The configured source-priority ordering, highest priority first.
    #[must_use]
    pub fn source_priority(&self) -> Vec<String> {
        self.adapters
            .iter()
            .map(|a| a.source_tag().to_owned())
            .collect()
    }

    /// Resolves one identifier into a canonical product.
    ///
    /// Individual source failures and timeouts are logged and absorbed;
    /// a source that contributes nothing is indistinguishable from one
    /// that was never queried. The whole gather is additionally bounded
    /// by the overall deadline.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::RateLimited`] if the governor rejects the caller.
    /// - [`ResolveError::NotFound`] if no source produced data in time.
    pub async fn resolve(
        &self,
        caller_key: &str,
        identifier: &str,
    ) -> Result<CanonicalProduct, ResolveError> {
        if !self.governor.admit(caller_key) {
            return Err(ResolveError::RateLimited {
                caller: caller_key.to_owned(),
            });
        }

        let gather = query_all(&self.adapters, identifier, self.per_source_timeout);
        let settled = match tokio::time::timeout(self.overall_deadline, gather).await {
            Ok(settled) => settled,
            Err(_) => {
                tracing::warn!(
                    identifier,
                    deadline_ms = u64::try_from(self.overall_deadline.as_millis())
                        .unwrap_or(u64::MAX),
                    "overall lookup deadline elapsed before any source settled"
                );
                Vec::new()
            }
        };

        let mut records: Vec<SourceRecord> = Vec::new();
        for (tag, outcome) in settled {
            match outcome {
                Ok(record) if record.has_data() => records.push(record),
                Ok(_) => {
                    tracing::debug!(source = tag, identifier, "source answered with no data");
                }
                Err(e) => {
                    tracing::warn!(source = tag, identifier, error = %e, "source lookup failed");
                }
            }
        }

        if records.is_empty() {
            return Err(ResolveError::NotFound {
                identifier: identifier.to_owned(),
            });
        }

        tracing::debug!(
            identifier,
            sources = records.len(),
            "merging source records"
        );
        Ok(merge_records(&records, &self.source_priority()))
    }
}
