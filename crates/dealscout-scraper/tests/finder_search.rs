//! Integration tests for `ProductFinder`.
//!
//! Uses `wiremock` to stand up a local HTTP server per test so no real
//! network traffic is made. The registry entries point their search
//! endpoints at the mock server; product pages are canned storefront
//! markup. Scenarios cover both entry modes, partial-failure isolation,
//! validation filtering, and the explicit-store lookup contract.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dealscout_scraper::{
    PageFetcher, ProductFinder, ScrapeError, ScraperRegistry, StoreEntry, StoreStrategy,
};

fn test_fetcher() -> PageFetcher {
    PageFetcher::new(5, "dealscout-test/0.1", "https://www.google.com", 0, 0)
        .expect("failed to build test PageFetcher")
}

fn entry(domain: &str, name: &str, search_base: String, strategy: StoreStrategy) -> StoreEntry {
    StoreEntry {
        domain: domain.to_owned(),
        display_name: name.to_owned(),
        search_base,
        strategy,
    }
}

/// Three-store registry pointed at the mock server: Amazon-, eBay-, and
/// Walmart-shaped endpoints under distinct path prefixes.
fn test_registry(server_uri: &str) -> ScraperRegistry {
    ScraperRegistry::new(vec![
        entry(
            "amazon.test",
            "Amazon",
            format!("{server_uri}/amazon/s?k="),
            StoreStrategy::Amazon,
        ),
        entry(
            "ebay.test",
            "eBay",
            format!("{server_uri}/ebay/sch/i.html?_nkw="),
            StoreStrategy::Ebay,
        ),
        entry(
            "walmart.test",
            "Walmart",
            format!("{server_uri}/walmart/search?q="),
            StoreStrategy::Walmart,
        ),
    ])
}

fn finder(server_uri: &str) -> ProductFinder {
    ProductFinder::new(test_registry(server_uri), test_fetcher(), 3)
}

// ---------------------------------------------------------------------------
// Canned storefront markup
// ---------------------------------------------------------------------------

fn amazon_search_page(product_href: &str) -> String {
    format!(
        r#"<html><body>
        <div data-component-type="s-search-result">
            <h2><a class="a-link-normal s-link-style" href="{product_href}">Result</a></h2>
        </div>
        </body></html>"#
    )
}

fn amazon_product_page(title: &str, price: &str) -> String {
    format!(
        r#"<html><body>
        <span id="productTitle">{title}</span>
        <div class="a-price"><span class="a-offscreen">{price}</span></div>
        <span id="acrPopover" title="4.6 out of 5 stars"></span>
        <span id="acrCustomerReviewText">1,234 ratings</span>
        <div id="availability"><span>In Stock</span></div>
        <input id="add-to-cart-button"/>
        </body></html>"#
    )
}

fn ebay_search_page(product_href: &str) -> String {
    format!(
        r#"<html><body>
        <li class="s-item"><a class="s-item__link" href="{product_href}">Result</a></li>
        </body></html>"#
    )
}

fn ebay_product_page(title: &str, price: &str) -> String {
    format!(
        r#"<html><body>
        <div class="x-item-title__mainTitle">
            <span class="ux-textspans ux-textspans--BOLD">{title}</span>
        </div>
        <div class="x-price-primary"><span class="ux-textspans">{price}</span></div>
        <a id="binBtn_btn">Buy It Now</a>
        </body></html>"#
    )
}

fn walmart_search_page(product_href: &str) -> String {
    format!(
        r#"<html><body>
        <a data-testid="product-title-link" href="{product_href}">Result</a>
        </body></html>"#
    )
}

fn walmart_product_page(title: &str, price: &str) -> String {
    format!(
        r#"<html><body>
        <h1 itemprop="name">{title}</h1>
        <div data-testid="product-buy-box"><span itemprop="price" content="{price}">${price}</span></div>
        <button data-testid="add-to-cart-section-button">Add to cart</button>
        </body></html>"#
    )
}

// ---------------------------------------------------------------------------
// Name mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn name_search_collects_from_every_store_sorted_by_price() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/amazon/s"))
        .and(query_param("k", "widget pro"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(amazon_search_page(&format!("{uri}/amazon/dp/B0WIDGET01"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/amazon/dp/B0WIDGET01"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(amazon_product_page("Widget Pro 3000", "$139.99")),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/ebay/sch/i.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ebay_search_page(&format!("{uri}/ebay/itm/123456789012"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ebay/itm/123456789012"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ebay_product_page("Widget Pro 3000", "US $124.50")),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/walmart/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(walmart_search_page(&format!("{uri}/walmart/ip/Widget/42"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/walmart/ip/Widget/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(walmart_product_page("Widget Pro 3000", "129.00")),
        )
        .mount(&server)
        .await;

    let results = finder(&uri).search("widget pro").await;

    assert_eq!(results.len(), 3, "every store contributes one record");
    let prices: Vec<f64> = results.iter().filter_map(|r| r.current_price).collect();
    assert_eq!(prices, vec![124.50, 129.00, 139.99], "ascending price order");
    assert_eq!(results[0].store_name, "eBay");
}

#[tokio::test]
async fn failing_stores_are_isolated_from_the_batch() {
    let server = MockServer::start().await;
    let uri = server.uri();

    // Amazon: healthy.
    Mock::given(method("GET"))
        .and(path("/amazon/s"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(amazon_search_page(&format!("{uri}/amazon/dp/B0WIDGET01"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/amazon/dp/B0WIDGET01"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(amazon_product_page("Widget Pro 3000", "$139.99")),
        )
        .mount(&server)
        .await;

    // eBay: server error. Walmart: no mock at all (404).
    Mock::given(method("GET"))
        .and(path("/ebay/sch/i.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    // 3 targets, 2 failures => exactly 1 record and no error surfaced.
    let results = finder(&uri).search("widget pro").await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].store_name, "Amazon");
}

#[tokio::test]
async fn invalid_records_are_filtered_not_fatal() {
    let server = MockServer::start().await;
    let uri = server.uri();

    // Amazon result is a renewed unit; must be discarded.
    Mock::given(method("GET"))
        .and(path("/amazon/s"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(amazon_search_page(&format!("{uri}/amazon/dp/B0RENEWED1"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/amazon/dp/B0RENEWED1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(amazon_product_page(
            "Widget Pro 3000 (Renewed)",
            "$99.99",
        )))
        .mount(&server)
        .await;

    // eBay result has no parseable price; must be discarded.
    Mock::given(method("GET"))
        .and(path("/ebay/sch/i.html"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ebay_search_page(&format!("{uri}/ebay/itm/123456789012"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ebay/itm/123456789012"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ebay_product_page("Widget Pro 3000", "Contact seller")),
        )
        .mount(&server)
        .await;

    // Walmart: healthy.
    Mock::given(method("GET"))
        .and(path("/walmart/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(walmart_search_page(&format!("{uri}/walmart/ip/Widget/42"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/walmart/ip/Widget/42"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(walmart_product_page("Widget Pro 3000", "129.00")),
        )
        .mount(&server)
        .await;

    let results = finder(&uri).search("widget pro").await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].store_name, "Walmart");
}

#[tokio::test]
async fn all_stores_empty_yields_empty_batch_not_error() {
    let server = MockServer::start().await;

    // Every search endpoint returns a page with no result entries.
    for search_path in ["/amazon/s", "/ebay/sch/i.html", "/walmart/search"] {
        Mock::given(method("GET"))
            .and(path(search_path))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<html><body>No matches</body></html>"),
            )
            .mount(&server)
            .await;
    }

    let results = finder(&server.uri()).search("nonexistent widget").await;
    assert!(results.is_empty());
}

// ---------------------------------------------------------------------------
// URL mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn url_search_merges_seed_with_remaining_stores() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let host = uri.trim_start_matches("http://").to_owned();

    // The registry key for the seed store must match the mock server host
    // so the finder treats the URL as originating from that store.
    let registry = ScraperRegistry::new(vec![
        entry(
            &host,
            "Amazon",
            format!("{uri}/amazon/s?k="),
            StoreStrategy::Amazon,
        ),
        entry(
            "ebay.test",
            "eBay",
            format!("{uri}/ebay/sch/i.html?_nkw="),
            StoreStrategy::Ebay,
        ),
    ]);
    let finder = ProductFinder::new(registry, test_fetcher(), 2);

    Mock::given(method("GET"))
        .and(path("/dp/B0WIDGET01"))
        .respond_with(ResponseTemplate::new(200).set_body_string(amazon_product_page(
            "Widget Pro 3000 - Silver 256GB",
            "$139.99",
        )))
        .mount(&server)
        .await;

    // The originating store's search endpoint must not be queried again.
    Mock::given(method("GET"))
        .and(path("/amazon/s"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    // The remaining store is searched with the normalized title.
    Mock::given(method("GET"))
        .and(path("/ebay/sch/i.html"))
        .and(query_param("_nkw", "Widget Pro 3000"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ebay_search_page(&format!("{uri}/ebay/itm/123456789012"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ebay/itm/123456789012"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(ebay_product_page("Widget Pro 3000", "US $124.50")),
        )
        .mount(&server)
        .await;

    let results = finder.search(&format!("{uri}/dp/B0WIDGET01")).await;

    assert_eq!(results.len(), 2, "seed plus one remaining-store record");
    assert_eq!(results[0].store_name, "eBay");
    assert_eq!(results[1].store_name, "Amazon");
}

#[tokio::test]
async fn invalid_seed_aborts_url_search_with_empty_batch() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let host = uri.trim_start_matches("http://").to_owned();

    let registry = ScraperRegistry::new(vec![
        entry(
            &host,
            "Amazon",
            format!("{uri}/amazon/s?k="),
            StoreStrategy::Amazon,
        ),
        entry(
            "ebay.test",
            "eBay",
            format!("{uri}/ebay/sch/i.html?_nkw="),
            StoreStrategy::Ebay,
        ),
    ]);
    let finder = ProductFinder::new(registry, test_fetcher(), 2);

    // Seed page has a title but no price: extraction succeeds, validation
    // rejects, and no name-based fallback is attempted.
    Mock::given(method("GET"))
        .and(path("/dp/B0NOPRICE1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <span id="productTitle">Widget Pro 3000</span>
            <input id="add-to-cart-button"/>
            </body></html>"#,
        ))
        .mount(&server)
        .await;

    // No other store may be contacted once the seed is rejected.
    Mock::given(method("GET"))
        .and(path("/ebay/sch/i.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
        .expect(0)
        .mount(&server)
        .await;

    let results = finder.search(&format!("{uri}/dp/B0NOPRICE1")).await;
    assert!(results.is_empty());
}

// ---------------------------------------------------------------------------
// Explicit store lookup
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_store_propagates_unknown_store() {
    let server = MockServer::start().await;
    let finder = finder(&server.uri());

    let err = finder
        .search_store("newegg.test", "widget pro")
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::UnknownStore { ref domain } if domain == "newegg.test"));
}

#[tokio::test]
async fn search_store_returns_unvalidated_record() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/amazon/s"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(amazon_search_page(&format!("{uri}/amazon/dp/B0RENEWED1"))),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/amazon/dp/B0RENEWED1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(amazon_product_page(
            "Widget Pro 3000 (Renewed)",
            "$99.99",
        )))
        .mount(&server)
        .await;

    // The explicit-store path hands back whatever was extracted; business
    // validation is the batch orchestration's concern.
    let record = finder(&uri)
        .search_store("amazon.test", "widget pro")
        .await
        .expect("extraction should succeed");
    assert_eq!(record.name, "Widget Pro 3000 (Renewed)");
    assert_eq!(record.current_price, Some(99.99));
}

// ---------------------------------------------------------------------------
// Generic fallback dispatch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unregistered_host_uses_generic_metadata_extraction() {
    let server = MockServer::start().await;
    let uri = server.uri();

    Mock::given(method("GET"))
        .and(path("/p/widget"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head>
            <meta property="og:title" content="Widget Pro 3000"/>
            <meta property="og:price:amount" content="135.49"/>
            </head><body>Buy now</body></html>"#,
        ))
        .mount(&server)
        .await;

    // Registry has no entry for the mock host, so dispatch falls through
    // to the generic strategy.
    let registry = ScraperRegistry::new(vec![entry(
        "amazon.test",
        "Amazon",
        format!("{uri}/amazon/s?k="),
        StoreStrategy::Amazon,
    )]);
    let finder = ProductFinder::new(registry, test_fetcher(), 1);

    let record = finder
        .scrape_product(&format!("{uri}/p/widget"))
        .await
        .expect("generic extraction should succeed");
    assert_eq!(record.name, "Widget Pro 3000");
    assert_eq!(record.current_price, Some(135.49));
    assert!(record.available);
}
