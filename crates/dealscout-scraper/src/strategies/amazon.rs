//! Amazon product-page and search-results extraction.

use chrono::Utc;
use regex::Regex;

use dealscout_core::ProductRecord;

use crate::dispatch::normalize_host;
use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::parse::{parse_count, parse_price, parse_rating, strip_tags};
use crate::strategies::{resolve_href, unescape_entities, NO_TITLE_FOUND};

pub(super) async fn scrape(
    fetcher: &PageFetcher,
    url: &str,
) -> Result<ProductRecord, ScrapeError> {
    let html = fetcher.fetch_html(url).await?;

    Ok(ProductRecord {
        name: extract_title(&html),
        current_price: extract_price(&html),
        original_price: extract_list_price(&html),
        currency: None,
        store_name: "Amazon".to_owned(),
        store_id: normalize_host(url),
        image_url: extract_image(&html),
        product_url: url.to_owned(),
        available: check_availability(&html),
        stock_quantity: None,
        rating: extract_rating(&html),
        review_count: extract_review_count(&html),
        last_updated: Utc::now(),
        product_id: extract_asin(url),
        brand: None,
        category: None,
    })
}

pub(super) async fn scrape_first_search_result(
    fetcher: &PageFetcher,
    search_url: &str,
    query: &str,
) -> Result<ProductRecord, ScrapeError> {
    let html = fetcher.fetch_html(search_url).await?;

    let Some(href) = first_organic_result_href(&html) else {
        return Err(ScrapeError::NoSearchResults {
            store: "Amazon".to_owned(),
            query: query.to_owned(),
        });
    };

    let product_url = resolve_href(search_url, &unescape_entities(&href));
    scrape(fetcher, &product_url).await
}

/// Scans the result blocks in order, skips blocks flagged as sponsored, and
/// returns the product href of the first organic one.
fn first_organic_result_href(html: &str) -> Option<String> {
    if !html.contains("s-search-result") {
        return None;
    }

    let marker = Regex::new(r#"data-component-type="s-search-result""#).expect("valid regex");
    let link_patterns = [
        r#"<a[^>]*class="[^"]*a-link-normal[^"]*"[^>]*href="([^"]+)""#,
        r#"<a[^>]*href="([^"]+)"[^>]*class="[^"]*a-link-normal[^"]*""#,
        r#"href="(/dp/[^"]+)""#,
    ];

    let starts: Vec<usize> = marker.find_iter(html).map(|m| m.start()).collect();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(html.len());
        let block = &html[start..end];

        if block.contains("Sponsored") {
            continue;
        }

        for pattern in &link_patterns {
            let re = Regex::new(pattern).expect("valid regex");
            if let Some(cap) = re.captures(block) {
                return Some(cap[1].to_string());
            }
        }
    }

    None
}

fn extract_title(html: &str) -> String {
    let re = Regex::new(r#"(?s)<[^>]*id="productTitle"[^>]*>(.*?)</"#).expect("valid regex");
    re.captures(html)
        .map(|cap| unescape_entities(&strip_tags(&cap[1])))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE_FOUND.to_owned())
}

fn extract_price(html: &str) -> Option<f64> {
    // The a-offscreen span inside the buy-box price block carries the full
    // price text; the visible markup splits it across nested spans.
    let re = Regex::new(r#"class="a-offscreen"[^>]*>([^<]+)<"#).expect("valid regex");
    re.captures(html).and_then(|cap| parse_price(&cap[1]))
}

fn extract_list_price(html: &str) -> Option<f64> {
    if !html.contains("basisPrice") {
        return None;
    }
    let re = Regex::new(r#"(?s)basisPrice.*?class="a-offscreen"[^>]*>([^<]+)<"#)
        .expect("valid regex");
    re.captures(html).and_then(|cap| parse_price(&cap[1]))
}

fn extract_image(html: &str) -> Option<String> {
    let patterns = [
        r#"<img[^>]*id="landingImage"[^>]*src="([^"]+)""#,
        r#"<img[^>]*src="([^"]+)"[^>]*id="landingImage""#,
    ];
    for pattern in &patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(html) {
            return Some(unescape_entities(&cap[1]));
        }
    }
    None
}

fn check_availability(html: &str) -> bool {
    let availability_block = Regex::new(r#"(?s)<[^>]*id="availability"[^>]*>(.*?)</div>"#)
        .expect("valid regex");
    if let Some(cap) = availability_block.captures(html) {
        if strip_tags(&cap[1]).to_lowercase().contains("unavailable") {
            return false;
        }
    }
    html.contains(r#"id="add-to-cart-button""#)
}

fn extract_rating(html: &str) -> Option<f64> {
    let patterns = [
        r#"id="acrPopover"[^>]*title="([^"]+)""#,
        r#"title="([^"]+)"[^>]*id="acrPopover""#,
    ];
    for pattern in &patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(html) {
            return parse_rating(&cap[1]);
        }
    }
    None
}

fn extract_review_count(html: &str) -> Option<u32> {
    let re = Regex::new(r#"(?s)<[^>]*id="acrCustomerReviewText"[^>]*>(.*?)</"#)
        .expect("valid regex");
    re.captures(html).and_then(|cap| parse_count(&cap[1]))
}

/// The ASIN embedded in canonical product URLs doubles as the store-assigned
/// product ID.
fn extract_asin(url: &str) -> Option<String> {
    let re = Regex::new(r"/(?:dp|gp/product)/([A-Z0-9]{10})").expect("valid regex");
    re.captures(url).map(|cap| cap[1].to_string())
}
