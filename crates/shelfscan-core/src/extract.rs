//! Identifier extraction from noisy recognized text.
//!
//! OCR output is scanned for three pattern classes, in priority order:
//! 12–14 contiguous digits (UPC / EAN-13 / EAN-14), exactly 8 contiguous
//! digits (EAN-8), and runs of 6+ uppercase alphanumerics (SKUs, model
//! numbers). Matches are deduplicated and ranked so that longer, more
//! specific codes come first. "Nothing found" is an ordinary empty
//! result, never an error.

use regex::Regex;

use crate::types::{BarcodeFormat, IdentifierCandidate};

/// Pattern classes in priority order. Longer digit runs are tried first so
/// that a 13-digit EAN is not also reported as its embedded 8-digit slice.
const PATTERNS: &[&str] = &[
    r"\b\d{12,14}\b",
    r"\b\d{8}\b",
    r"\b[0-9A-Z]{6,}\b",
];

/// Scans `text` for plausible product identifiers and returns them ranked
/// by descending length, then descending confidence.
///
/// Duplicate values (the same code matched by more than one pattern class
/// or appearing twice in the text) are collapsed to their first occurrence.
/// Returns an empty vector when no pattern matches.
#[must_use]
pub fn extract_identifiers(text: &str) -> Vec<IdentifierCandidate> {
    let mut values: Vec<String> = Vec::new();
    for pattern in PATTERNS {
        let re = Regex::new(pattern).expect("valid identifier regex");
        for m in re.find_iter(text) {
            let value = m.as_str().to_owned();
            if !values.contains(&value) {
                values.push(value);
            }
        }
    }

    let mut candidates: Vec<IdentifierCandidate> = values
        .into_iter()
        .map(|value| {
            let confidence = candidate_confidence(&value);
            let format = classify_format(&value);
            IdentifierCandidate {
                value,
                format,
                confidence,
            }
        })
        .collect();

    // Longer codes first; confidence breaks length ties. The sort is
    // stable, so equal candidates keep pattern-priority order.
    candidates.sort_by(|a, b| {
        b.value
            .len()
            .cmp(&a.value.len())
            .then(b.confidence.cmp(&a.confidence))
    });

    candidates
}

/// Heuristic confidence score for one extracted value, in `[0, 100]`.
///
/// Additive: +40 for length 12/13, +35 for length 8, +20 for any other
/// length ≥ 6; +30 if all digits, else +20 if uppercase alphanumeric;
/// +30 more if a 12/13-digit value passes the check-digit test.
#[must_use]
pub fn candidate_confidence(value: &str) -> u8 {
    if value.is_empty() {
        return 0;
    }

    let mut confidence = 0u32;
    match value.len() {
        12 | 13 => confidence += 40,
        8 => confidence += 35,
        n if n >= 6 => confidence += 20,
        _ => {}
    }

    if value.chars().all(|c| c.is_ascii_digit()) {
        confidence += 30;
    } else if value.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()) {
        confidence += 20;
    }

    if (value.len() == 12 || value.len() == 13) && has_valid_check_digit(value) {
        confidence += 30;
    }

    u8::try_from(confidence.min(100)).expect("confidence capped at 100")
}

/// Modulo-10 weighted check-digit test for UPC/EAN codes.
///
/// The final digit is the check digit. The remaining digits are weighted
/// 1/3 alternating from the leading digit, and the expected check digit is
/// `(10 - sum % 10) % 10`. Returns `false` for non-digit input.
#[must_use]
pub fn has_valid_check_digit(value: &str) -> bool {
    let digits: Option<Vec<u32>> = value.chars().map(|c| c.to_digit(10)).collect();
    let Some(digits) = digits else {
        return false;
    };
    let Some((&check, body)) = digits.split_last() else {
        return false;
    };

    let sum: u32 = body
        .iter()
        .enumerate()
        .map(|(i, d)| d * if i % 2 == 0 { 1 } else { 3 })
        .sum();

    (10 - sum % 10) % 10 == check
}

/// Classifies a value's barcode format from its shape alone.
#[must_use]
pub fn classify_format(value: &str) -> BarcodeFormat {
    let all_digits = !value.is_empty() && value.chars().all(|c| c.is_ascii_digit());
    if all_digits {
        match value.len() {
            8 => return BarcodeFormat::Ean8,
            12 => return BarcodeFormat::UpcA,
            13 => return BarcodeFormat::Ean13,
            _ => {}
        }
    }
    let alphanumeric = Regex::new(r"^[0-9A-Z]{6,}$").expect("valid alphanumeric regex");
    if alphanumeric.is_match(value) {
        BarcodeFormat::Alphanumeric
    } else {
        BarcodeFormat::Unknown
    }
}

/// Pure predicate: is this value a plausible product code at all?
///
/// Whitespace is stripped and letters uppercased before testing against
/// the known shapes (EAN-8, UPC-A, EAN-13, 6+ uppercase alphanumerics).
/// Independent of confidence scoring.
#[must_use]
pub fn is_plausible_code(value: &str) -> bool {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if cleaned.is_empty() {
        return false;
    }

    let shapes = [r"^\d{8}$", r"^\d{12}$", r"^\d{13}$", r"^[0-9A-Z]{6,}$"];
    shapes.iter().any(|shape| {
        Regex::new(shape)
            .expect("valid code shape regex")
            .is_match(&cleaned)
    })
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod extract_test;
