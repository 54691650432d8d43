//! eBay listing-page and search-results extraction.

use chrono::Utc;
use regex::Regex;

use dealscout_core::ProductRecord;

use crate::dispatch::normalize_host;
use crate::error::ScrapeError;
use crate::fetch::PageFetcher;
use crate::parse::{parse_count, parse_price, strip_tags};
use crate::strategies::{resolve_href, unescape_entities, NO_TITLE_FOUND};

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
        store_name: "eBay".to_owned(),
        store_id: normalize_host(url),
        image_url: extract_image(&html),
        product_url: url.to_owned(),
        available: check_availability(&html),
        stock_quantity: None,
        // The prominent rating on a listing belongs to the seller, not the
        // product, so none is extracted.
        rating: None,
        review_count: extract_review_count(&html),
        last_updated: Utc::now(),
        product_id: extract_item_id(url),
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

    let Some(href) = first_result_href(&html) else {
        return Err(ScrapeError::NoSearchResults {
            store: "eBay".to_owned(),
            query: query.to_owned(),
        });
    };

    let product_url = resolve_href(search_url, &unescape_entities(&href));
    scrape(fetcher, &product_url).await
}

fn first_result_href(html: &str) -> Option<String> {
    if !html.contains("s-item") {
        return None;
    }
    let patterns = [
        r#"<a[^>]*class="[^"]*s-item__link[^"]*"[^>]*href="([^"]+)""#,
        r#"<a[^>]*href="([^"]+)"[^>]*class="[^"]*s-item__link[^"]*""#,
    ];
    for pattern in &patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(html) {
            return Some(cap[1].to_string());
        }
    }
    None
}

fn extract_title(html: &str) -> String {
    let re = Regex::new(
        r#"(?s)x-item-title__mainTitle.*?ux-textspans--BOLD[^>]*>(.*?)</span>"#,
    )
    .expect("valid regex");
    re.captures(html)
        .map(|cap| unescape_entities(&strip_tags(&cap[1])))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE_FOUND.to_owned())
}

fn extract_price(html: &str) -> Option<f64> {
    let re = Regex::new(r#"(?s)x-price-primary.*?class="ux-textspans"[^>]*>([^<]+)<"#)
        .expect("valid regex");
    re.captures(html).and_then(|cap| parse_price(&cap[1]))
}

fn extract_image(html: &str) -> Option<String> {
    let re = Regex::new(
        r#"(?s)ux-image-carousel-item[^"]*active.*?<img[^>]*src="([^"]+)""#,
    )
    .expect("valid regex");
    re.captures(html).map(|cap| unescape_entities(&cap[1]))
}

fn check_availability(html: &str) -> bool {
    let ended = Regex::new(r#"(?s)d-quantity__availability.*?ux-textspans--BOLD[^>]*>([^<]+)<"#)
        .expect("valid regex");
    if let Some(cap) = ended.captures(html) {
        let text = cap[1].to_lowercase();
        if text.contains("ended") || text.contains("no longer available") {
            return false;
        }
    }
    // A buy-it-now or add-to-cart button means the listing is live.
    html.contains(r#"id="binBtn_btn""#) || html.contains(r#"id="isCartBtn_btn""#)
}

fn extract_review_count(html: &str) -> Option<u32> {
    let re = Regex::new(
        r#"(?s)href="[^"]*#Reviews[^"]*".*?ux-textspans--PSEUDOLINK[^>]*>([^<]+)<"#,
    )
    .expect("valid regex");
    re.captures(html).and_then(|cap| parse_count(&cap[1]))
}

fn extract_item_id(url: &str) -> Option<String> {
    let re = Regex::new(r"/itm/(?:[^/]+/)?(\d+)").expect("valid regex");
    re.captures(url).map(|cap| cap[1].to_string())
}
