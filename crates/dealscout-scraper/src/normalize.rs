//! Cross-store product-name normalization.
//!
//! A title scraped from one store carries store-specific noise — storage
//! size variants, condition labels, parenthetical and comma suffixes —
//! that sabotages searching the same product on other stores. This trims
//! the title down to the portion stores agree on.

use regex::Regex;

/// Longest name kept when no noise pattern matches.
const MAX_NAME_LEN: usize = 50;

/// Normalizes a full product title into a cross-store search term.
///
/// Cuts the title at the first occurrence of: a storage-size token
/// (`"256GB"`, `"512 GB"`), a `" - "` separator, an opening parenthesis, a
/// comma, or a condition keyword (`renewed`, `refurbished`, `unlocked`),
/// case-insensitively. When nothing matches, the title is truncated to 50
/// characters.
///
/// `"iPhone 15 Pro Max 256GB (Renewed)"` → `"iPhone 15 Pro Max"`.
#[must_use]
pub fn normalize_product_name(full_name: &str) -> String {
    let re = Regex::new(r"(?i)^(.*?)(\s+\d+\s?g?b\b|\s+-\s+|\s*\(|\s*,|renewed|refurbished|unlocked)")
        .expect("valid regex");

    if let Some(cap) = re.captures(full_name) {
        return cap[1].trim().to_owned();
    }

    if full_name.chars().count() > MAX_NAME_LEN {
        full_name.chars().take(MAX_NAME_LEN).collect()
    } else {
        full_name.to_owned()
    }
}
