//! Product lookup: concurrent fan-out to external barcode databases and
//! deterministic merging of their answers into one canonical record.
//!
//! Each external database sits behind a [`SourceAdapter`]; the
//! [`Resolver`] queries every configured adapter concurrently with
//! independent timeouts, absorbs individual failures, and merges
//! whatever answered into a [`shelfscan_core::CanonicalProduct`].

pub mod adapters;
pub mod config;
pub mod error;
pub mod merge;
pub mod resolve;

mod retry;

pub use adapters::{
    BarcodeLookupAdapter, OpenFoodFactsAdapter, SourceAdapter, UpcItemDbAdapter,
};
pub use config::LookupConfig;
pub use error::{LookupError, ResolveError};
pub use merge::merge_records;
pub use resolve::Resolver;
