//! Walmart product-page and search-results extraction.

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
        store_name: "Walmart".to_owned(),
        store_id: normalize_host(url),
        image_url: extract_image(&html),
        product_url: url.to_owned(),
        available: check_availability(&html),
        stock_quantity: None,
        rating: extract_rating(&html),
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
            store: "Walmart".to_owned(),
            query: query.to_owned(),
        });
    };

    let product_url = resolve_href(search_url, &unescape_entities(&href));
    scrape(fetcher, &product_url).await
}

fn first_result_href(html: &str) -> Option<String> {
    let patterns = [
        r#"<a[^>]*data-testid="product-title-link"[^>]*href="([^"]+)""#,
        r#"<a[^>]*href="([^"]+)"[^>]*data-testid="product-title-link""#,
        // Older grid markup: any link inside an item container.
        r#"(?s)<div[^>]*data-item-id[^>]*>.*?<a[^>]*href="([^"]+)""#,
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
    let re = Regex::new(r#"(?s)<h1[^>]*itemprop="name"[^>]*>(.*?)</h1>"#).expect("valid regex");
    re.captures(html)
        .map(|cap| unescape_entities(&strip_tags(&cap[1])))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| NO_TITLE_FOUND.to_owned())
}

fn extract_price(html: &str) -> Option<f64> {
    // The buy-box price element carries the machine-readable value in its
    // content attribute.
    let patterns = [
        r#"itemprop="price"[^>]*content="([^"]+)""#,
        r#"content="([^"]+)"[^>]*itemprop="price""#,
    ];
    for pattern in &patterns {
        let re = Regex::new(pattern).expect("valid regex");
        if let Some(cap) = re.captures(html) {
            if let Some(price) = parse_price(&cap[1]) {
                return Some(price);
            }
        }
    }
    None
}

fn extract_image(html: &str) -> Option<String> {
    let re = Regex::new(
        r#"(?s)data-testid="media-thumbnail-container".*?<img[^>]*src="([^"]+)""#,
    )
    .expect("valid regex");
    re.captures(html).map(|cap| unescape_entities(&cap[1]))
}

fn check_availability(html: &str) -> bool {
    if html.contains(r#"data-testid="outOfStock-PUP""#) {
        return false;
    }
    html.contains(r#"data-testid="add-to-cart-section-button""#)
}

fn extract_rating(html: &str) -> Option<f64> {
    let re = Regex::new(r#"<span[^>]*class="f7 mr1 b black"[^>]*>([^<]+)<"#).expect("valid regex");
    re.captures(html).and_then(|cap| parse_rating(&cap[1]))
}

fn extract_review_count(html: &str) -> Option<u32> {
    let re = Regex::new(r##"(?s)<a[^>]*href="#reviews"[^>]*>(.*?)</a>"##).expect("valid regex");
    re.captures(html)
        .and_then(|cap| parse_count(&strip_tags(&cap[1])))
}

fn extract_item_id(url: &str) -> Option<String> {
    let re = Regex::new(r"/ip/(?:[^/?]+/)?(\d+)").expect("valid regex");
    re.captures(url).map(|cap| cap[1].to_string())
}
