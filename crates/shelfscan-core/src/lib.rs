//! Shared domain model for the shelfscan product resolution engine.
//!
//! Pure types and synchronous logic only: identifier extraction from
//! noisy OCR text, the sliding-window outbound rate governor, and the
//! record/listing/history types shared by the lookup and compare
//! crates. Nothing in this crate performs I/O.

pub mod extract;
pub mod governor;
pub mod types;

pub use extract::{classify_format, extract_identifiers, is_plausible_code};
pub use governor::{GovernorSet, RateGovernor};
pub use types::{
    BarcodeFormat, CanonicalProduct, IdentifierCandidate, ImageRef, MatchResult,
    PriceHistoryEntry, ProductIdentifier, RetailerListing, SourceRecord,
};
