//! Identifier extraction and product resolution command handlers.

use shelfscan_core::extract_identifiers;
use shelfscan_lookup::LookupConfig;

const CALLER_KEY: &str = "cli";

/// Print the ranked identifier candidates found in `text` as JSON.
///
/// # Errors
///
/// Returns an error if no plausible identifier is found.
pub(crate) fn run_extract(text: &str) -> anyhow::Result<()> {
    let candidates = extract_identifiers(text);
    if candidates.is_empty() {
        anyhow::bail!("no plausible product identifier found in input");
    }
    println!("{}", serde_json::to_string_pretty(&candidates)?);
    Ok(())
}

/// Resolve the best identifier in `text` against the configured lookup
/// sources and print the merged canonical product.
///
/// # Errors
///
/// Returns an error if extraction finds nothing, configuration is
/// invalid, or no source recognizes the identifier.
pub(crate) async fn run_resolve(text: &str) -> anyhow::Result<()> {
    let candidates = extract_identifiers(text);
    let Some(best) = candidates.first() else {
        anyhow::bail!("no plausible product identifier found in input");
    };
    tracing::info!(
        identifier = %best.value,
        confidence = best.confidence,
        "resolving best candidate"
    );

    let config = LookupConfig::from_env().map_err(anyhow::Error::msg)?;
    let resolver = config.resolver()?;
    let product = resolver.resolve(CALLER_KEY, &best.value).await?;
    println!("{}", serde_json::to_string_pretty(&product)?);
    Ok(())
}

/// Resolve `identifier` to a canonical product for other commands.
pub(crate) async fn resolve_identifier(
    identifier: &str,
) -> anyhow::Result<shelfscan_core::CanonicalProduct> {
    let config = LookupConfig::from_env().map_err(anyhow::Error::msg)?;
    let resolver = config.resolver()?;
    Ok(resolver.resolve(CALLER_KEY, identifier).await?)
}
