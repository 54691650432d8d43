//! Best Buy product-page and search-results extraction.

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
        original_price: None,
        currency: None,
        store_name: "Best Buy".to_owned(),
        store_id: normalize_host(url),
        image_url: extract_image(&html),
        product_url: url.to_owned(),
        available: check_availability(&html),
        stock_quantity: None,
        rating: extract_rating(&html),
        review_count: extract_review_count(&html),
        last_updated: Utc::now(),
        product_id: extract_sku_id(url),
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
            store: "Best Buy".to_owned(),
            query: query.to_owned(),
        });
    };

    let product_url = resolve_href(search_url, &unescape_entities(&href));
    scrape(fetcher, &product_url).await
}

fn first_result_href(html: &str) -> Option<String> {
    if !html.contains("sku-item") {
        return None;
    }
    let re = Regex::new(r#"(?s)<h4[^>]*class="[^"]*sku-title[^"]*"[^>]*>\s*<a[^>]*href="([^"]+)""#)
        .expect("valid regex");
    re.captures(html).map(|cap| cap[1].to_string())
}

fn extract_title(html: &str) -> String {
    let re = Regex::new(r#"(?s)<h1[^>]*class="[^"]*heading-5[^"]*"[^>]*>(.*?)</h1>"#)
        .expect("valid regex");
    re.captures(html)
        .map(|cap| unescape_entities(&strip_tags(&cap[1])))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE_FOUND.to_owned())
}

fn extract_price(html: &str) -> Option<f64> {
    let re = Regex::new(
        r#"(?s)priceView-customer-price.*?<span[^>]*aria-hidden="true"[^>]*>([^<]+)<"#,
    )
    .expect("valid regex");
    re.captures(html).and_then(|cap| parse_price(&cap[1]))
}

fn extract_image(html: &str) -> Option<String> {
    let patterns = [
        r#"<img[^>]*class="[^"]*primary-image[^"]*"[^>]*src="([^"]+)""#,
        r#"<img[^>]*src="([^"]+)"[^>]*class="[^"]*primary-image[^"]*""#,
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
    // Availability is read from the add-to-cart button text; a missing
    // button means the product is not purchasable online.
    let re = Regex::new(r#"(?s)<button[^>]*class="[^"]*add-to-cart-button[^"]*"[^>]*>(.*?)</button>"#)
        .expect("valid regex");
    match re.captures(html) {
        Some(cap) => {
            let text = strip_tags(&cap[1]).to_lowercase();
            !text.contains("sold out") && !text.contains("unavailable")
        }
        None => false,
    }
}

fn extract_rating(html: &str) -> Option<f64> {
    let re = Regex::new(r#"(?s)<[^>]*class="[^"]*ugc-c-review-average[^"]*"[^>]*>(.*?)</"#)
        .expect("valid regex");
    re.captures(html)
        .and_then(|cap| parse_rating(strip_tags(&cap[1]).as_str()))
}

fn extract_review_count(html: &str) -> Option<u32> {
    let re = Regex::new(r#"(?s)<[^>]*class="[^"]*c-reviews-v4-count[^"]*"[^>]*>(.*?)</"#)
        .expect("valid regex");
    re.captures(html)
        .and_then(|cap| parse_count(&strip_tags(&cap[1])))
}

fn extract_sku_id(url: &str) -> Option<String> {
    let re = Regex::new(r"[?&]skuId=(\d+)").expect("valid regex");
    re.captures(url).map(|cap| cap[1].to_string())
}
