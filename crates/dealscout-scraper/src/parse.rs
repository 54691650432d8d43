//! Low-level text parsing helpers shared by the extraction strategies.
//!
//! These functions operate on small captured fragments of storefront HTML
//! and stay dependency-light on purpose. A parse failure always means "field
//! absent", never an error; see [`crate::strategies`] for how they compose
//! into full record extraction.

/// Normalizes raw price text for numeric parsing: strips everything except
/// digits, commas, and dots, then unifies the comma decimal separator to a
/// dot.
///
/// `"$1,299.99"` → `"1299.99"` is NOT what this produces — thousands
/// separators are treated as decimal commas, matching storefronts that
/// write `"129,99"`. Text that mixes both (`"1.299,99"`) ends up with two
/// dots and fails the downstream parse, leaving the field absent.
/// Already-numeric input passes through unchanged.
pub(crate) fn normalize_price_text(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Parses a price from raw storefront text. Returns `None` when no numeric
/// value survives normalization.
pub(crate) fn parse_price(raw: &str) -> Option<f64> {
    let cleaned = normalize_price_text(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Parses a count from text like `"1,234 ratings"` by concatenating every
/// digit run. Returns `None` when the text holds no digits.
pub(crate) fn parse_count(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<u32>().ok()
}

/// Parses a 0–5 rating from text like `"4.6 out of 5 stars"` or `"4,6"`.
/// Values outside the 0–5 scale are treated as unparseable.
pub(crate) fn parse_rating(raw: &str) -> Option<f64> {
    let token = raw.split_whitespace().next()?.replace(',', ".");
    let value = token.trim().parse::<f64>().ok()?;
    (0.0..=5.0).contains(&value).then_some(value)
}

/// Strips markup tags from an HTML fragment and collapses whitespace runs,
/// leaving the visible text.
pub(crate) fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    collapse_whitespace(&text)
}

fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = true;
    for c in s.chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}
