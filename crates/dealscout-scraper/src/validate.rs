//! Business validation of extracted records and dedup keys.
//!
//! Validation rejection is a filtered outcome, not an error: a record that
//! parsed structurally but fails these rules is logged and dropped without
//! affecting the rest of the batch.

use dealscout_core::ProductRecord;

use crate::strategies::NO_TITLE_FOUND;

/// Condition keywords that mark a listing as not-new; such listings are
/// never comparable against new-product prices.
const CONDITION_KEYWORDS: [&str; 3] = ["renewed", "refurbished", "usado"];

/// Checks a record against the business-validity rules.
///
/// Returns `None` when the record is acceptable, or a short human-readable
/// rejection reason:
/// - the title is blank or the not-found placeholder,
/// - the price is absent or non-positive,
/// - the title carries a condition keyword (renewed/refurbished/usado).
#[must_use]
pub fn validation_error(record: &ProductRecord) -> Option<&'static str> {
    if record.name.trim().is_empty() || record.name.eq_ignore_ascii_case(NO_TITLE_FOUND) {
        return Some("title not found");
    }

    if !record.current_price.is_some_and(|p| p > 0.0) {
        return Some("invalid price");
    }

    let lowered = record.name.to_lowercase();
    if CONDITION_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Some("not sold as new");
    }

    None
}

/// Computes a stable dedup key for a record.
///
/// SHA-256 over the store-assigned product ID when present, else over the
/// (URL, store) pair, both lower-cased. Hex-encoded.
#[must_use]
pub fn make_record_key(record: &ProductRecord) -> String {
    use sha2::{Digest, Sha256};

    let input = match &record.product_id {
        Some(id) => format!("id|{}", id.to_lowercase()),
        None => format!(
            "url|{}|{}",
            record.product_url.to_lowercase(),
            record.store_name.to_lowercase()
        ),
    };

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    let mut out = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(&mut out, "{byte:02x}");
    }
    out
}
