//! Deterministic merging of heterogeneous source records.
//!
//! Every field follows a fixed precedence rule so the merged product is
//! identical no matter which order the sources answered in: records are
//! first sorted by the configured source-priority ranking, then folded
//! left to right.

use shelfscan_core::{CanonicalProduct, ImageRef, SourceRecord};

/// Merges source records into one canonical product.
///
/// `source_priority` is the fixed, configured ordering of source tags;
/// earlier tags win ties. Tags absent from the list rank after all known
/// ones, ordered by tag name, so the result stays independent of
/// arrival order. At most one record per source tag is expected.
///
/// Field rules:
/// - `name`, `description`: longest non-empty value (tie → higher priority).
/// - `brand`, `category`, `suggested_price`: first non-empty value in
///   priority order. These are categorical, not prose, so "longer" says
///   nothing about quality.
/// - `images`: concatenated, deduplicated by URL keeping the first
///   occurrence; if no surviving image is primary, the first one is
///   marked primary.
/// - `identifiers`: union, deduplicated by `(type, value)`.
/// - `contributing_sources`: tag of every record that carried data.
///
/// # Panics
///
/// Panics on an empty input slice. The fan-out only declares a product
/// "found" once at least one source produced a record, so an empty merge
/// is a caller bug, not a recoverable condition.
#[must_use]
pub fn merge_records(records: &[SourceRecord], source_priority: &[String]) -> CanonicalProduct {
    assert!(
        !records.is_empty(),
        "merge_records requires at least one source record"
    );

    let rank = |tag: &str| {
        source_priority
            .iter()
            .position(|p| p == tag)
            .unwrap_or(usize::MAX)
    };

    let mut ordered: Vec<&SourceRecord> = records.iter().collect();
    ordered.sort_by(|a, b| {
        rank(&a.source_tag)
            .cmp(&rank(&b.source_tag))
            .then_with(|| a.source_tag.cmp(&b.source_tag))
    });

    let mut merged = CanonicalProduct::default();

    for record in &ordered {
        take_longest(&mut merged.name, record.name.as_deref());
        take_longest(&mut merged.description, record.description.as_deref());
        take_first(&mut merged.brand, record.brand.as_deref());
        take_first(&mut merged.category, record.category.as_deref());
        if merged.suggested_price.is_none() {
            merged.suggested_price = record.suggested_price;
        }

        for image in &record.images {
            if !merged.images.iter().any(|seen| seen.url == image.url) {
                merged.images.push(image.clone());
            }
        }

        for identifier in &record.identifiers {
            if !merged.identifiers.contains(identifier) {
                merged.identifiers.push(identifier.clone());
            }
        }

        if record.has_data() && !merged.contributing_sources.contains(&record.source_tag) {
            merged.contributing_sources.push(record.source_tag.clone());
        }
    }

    ensure_primary_image(&mut merged.images);

    merged
}

/// Longest-wins with ties going to the already-held (higher priority) value.
fn take_longest(slot: &mut Option<String>, candidate: Option<&str>) {
    let Some(candidate) = candidate.filter(|c| !c.trim().is_empty()) else {
        return;
    };
    let longer = slot
        .as_deref()
        .is_none_or(|current| candidate.len() > current.len());
    if longer {
        *slot = Some(candidate.to_owned());
    }
}

/// First-wins: only fills an empty slot.
fn take_first(slot: &mut Option<String>, candidate: Option<&str>) {
    if slot.is_none() {
        if let Some(candidate) = candidate.filter(|c| !c.trim().is_empty()) {
            *slot = Some(candidate.to_owned());
        }
    }
}

/// Marks the first image primary if no source marked one.
fn ensure_primary_image(images: &mut [ImageRef]) {
    if !images.is_empty() && !images.iter().any(|img| img.is_primary) {
        images[0].is_primary = true;
    }
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;
