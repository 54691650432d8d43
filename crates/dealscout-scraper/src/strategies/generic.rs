//! Metadata-based fallback extraction for unrecognized storefronts.
//!
//! Reads document-level metadata (Open Graph / microdata) instead of
//! site-specific markup, so it works — with reduced fidelity — on any
//! product page. Name search is unsupported: without a known search
//! endpoint only direct product URLs can be handled.

use chrono::Utc;
use regex::Regex;

use dealscout_core::ProductRecord;

use crate::dispatch::normalize_host;
use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::parse::{parse_price, strip_tags};
use crate::strategies::{unescape_entities, NO_TITLE_FOUND};

pub(super) async fn scrape(
    fetcher: &PageFetcher,
    url: &str,
) -> Result<ProductRecord, ScrapeError> {
    let html = fetcher.fetch_html(url).await?;

    Ok(ProductRecord {
        name: extract_title(&html),
        current_price: extract_price(&html),
        original_price: None,
        currency: None,
        store_name: store_name_from_url(url),
        store_id: normalize_host(url),
        image_url: extract_meta_content(&html, "og:image"),
        product_url: url.to_owned(),
        available: check_availability(&html),
        stock_quantity: None,
        rating: None,
        review_count: None,
        last_updated: Utc::now(),
        product_id: None,
        brand: None,
        category: None,
    })
}

fn extract_title(html: &str) -> String {
    if let Some(title) = extract_meta_content(html, "og:title") {
        return title;
    }
    let re = Regex::new(r"(?s)<title[^>]*>(.*?)</title>").expect("valid regex");
    re.captures(html)
        .map(|cap| unescape_entities(&strip_tags(&cap[1])))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE_FOUND.to_owned())
}

fn extract_meta_content(html: &str, property: &str) -> Option<String> {
    let patterns = [
        format!(r#"<meta[^>]*property=["']{property}["'][^>]*content=["']([^"']+)["']"#),
        format!(r#"<meta[^>]*content=["']([^"']+)["'][^>]*property=["']{property}["']"#),
    ];
    for pattern in &patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(html) {
            let content = unescape_entities(cap[1].trim());
            if !content.is_empty() {
                return Some(content);
            }
        }
    }
    None
}

fn extract_price(html: &str) -> Option<f64> {
    for property in ["og:price:amount", "product:price:amount"] {
        if let Some(content) = extract_meta_content(html, property) {
            if let Some(price) = parse_price(&content) {
                return Some(price);
            }
        }
    }

    // Microdata: value may live in a content attribute or the element text.
    let microdata = [
        r#"itemprop=["']price["'][^>]*content=["']([^"']+)["']"#,
        r#"(?s)<[^>]*itemprop=["']price["'][^>]*>([^<]+)<"#,
        r#"(?s)<[^>]*class=["'][^"']*\bprice\b[^"']*["'][^>]*>([^<]+)<"#,
    ];
    for pattern in &microdata {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(html) {
            if let Some(price) = parse_price(&cap[1]) {
                return Some(price);
            }
        }
    }
    None
}

fn check_availability(html: &str) -> bool {
    let body_text = strip_tags(html).to_lowercase();
    const UNAVAILABLE_KEYWORDS: [&str; 4] =
        ["out of stock", "unavailable", "agotado", "no disponible"];
    !UNAVAILABLE_KEYWORDS
        .iter()
        .any(|keyword| body_text.contains(keyword))
}

/// Derives a display name from the URL host: first label, capitalized.
/// `"https://www.newegg.com/p/123"` → `"Newegg"`.
fn store_name_from_url(url: &str) -> String {
    let host = normalize_host(url);
    let label = host.split('.').next().unwrap_or(&host);
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => "Unknown Store".to_owned(),
    }
}
