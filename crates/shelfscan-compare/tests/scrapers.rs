//! Scraper and comparer integration tests against wiremock storefronts.

use std::time::Duration;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shelfscan_compare::{
    AmazonScraper, CompareConfig, CompareError, ListingScraper, PriceComparer, ScraperRegistry,
    WalmartScraper,
};
use shelfscan_core::{CanonicalProduct, RateGovernor};

fn amazon_page() -> String {
    r#"<html><body>
        <div data-component-type="s-search-result">
          <h2 class="a-size-mini"><a href="/dp/B0AAA111"><span>Acme Widget Deluxe 2 Pack</span></a></h2>
          <img src="https://m.media.test/widget.jpg"/>
          <span class="a-price-whole">24</span><span class="a-price-fraction">99</span>
        </div>
        <div data-component-type="s-search-result">
          <h2><a href="/dp/B0BBB222"><span>Acme Widget Deluxe</span></a></h2>
          <span class="a-price-whole">19</span><span class="a-price-fraction">49</span>
        </div>
        <div data-component-type="s-search-result">
          <h2><a href="/dp/B0CCC333"><span>Generic Phone Case</span></a></h2>
          <span class="a-price-whole">7</span><span class="a-price-fraction">99</span>
        </div>
      </body></html>"#
        .to_owned()
}

fn walmart_page() -> String {
    r#"<html><body>
        <div data-testid="item-stack">
          <a href="/ip/acme-widget/42"><span data-automation-id="product-title">Acme Widget Deluxe</span></a>
          <span itemprop="price" content="17.88">$17.88</span>
          <img src="https://i5.test/widget.jpg"/>
        </div>
      </body></html>"#
        .to_owned()
}

fn widget_product() -> CanonicalProduct {
    CanonicalProduct {
        name: Some("Acme Widget Deluxe".to_owned()),
        brand: Some("Acme".to_owned()),
        ..CanonicalProduct::default()
    }
}

#[tokio::test]
async fn amazon_scraper_parses_search_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .and(query_param("k", "Acme Widget Deluxe"))
        .respond_with(ResponseTemplate::new(200).set_body_string(amazon_page()))
        .mount(&server)
        .await;

    let scraper = AmazonScraper::with_base_url(5, &server.uri()).expect("build scraper");
    let listings = scraper
        .fetch_listings("Acme Widget Deluxe", 10)
        .await
        .expect("fetch listings");

    assert_eq!(listings.len(), 3);
    assert_eq!(listings[0].title, "Acme Widget Deluxe 2 Pack");
    assert_eq!(listings[0].price, 24.99);
    assert_eq!(listings[0].retailer, "Amazon");
    assert_eq!(listings[0].currency, "USD");
    assert_eq!(
        listings[0].url.as_deref(),
        Some(format!("{}/dp/B0AAA111", server.uri()).as_str())
    );
    assert_eq!(
        listings[0].image_url.as_deref(),
        Some("https://m.media.test/widget.jpg")
    );
}

#[tokio::test]
async fn walmart_scraper_parses_search_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Acme Widget Deluxe"))
        .respond_with(ResponseTemplate::new(200).set_body_string(walmart_page()))
        .mount(&server)
        .await;

    let scraper = WalmartScraper::with_base_url(5, &server.uri()).expect("build scraper");
    let listings = scraper
        .fetch_listings("Acme Widget Deluxe", 10)
        .await
        .expect("fetch listings");

    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].title, "Acme Widget Deluxe");
    assert_eq!(listings[0].price, 17.88);
    assert_eq!(listings[0].retailer, "Walmart");
}

#[tokio::test]
async fn blocked_storefront_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let scraper = AmazonScraper::with_base_url(5, &server.uri()).expect("build scraper");
    let err = scraper
        .fetch_listings("anything", 10)
        .await
        .expect_err("503 must fail");
    assert!(matches!(err, CompareError::UnexpectedStatus { status, .. } if status == 503));
}

#[tokio::test]
async fn comparer_ranks_across_retailers_and_drops_irrelevant_listings() {
    let amazon = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(ResponseTemplate::new(200).set_body_string(amazon_page()))
        .mount(&amazon)
        .await;
    let walmart = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(walmart_page()))
        .mount(&walmart)
        .await;

    let config = CompareConfig {
        amazon_url: Some(amazon.uri()),
        walmart_url: Some(walmart.uri()),
        ..CompareConfig::default()
    };
    let comparer = config.comparer().expect("build comparer");

    let report = comparer
        .compare(
            "tester",
            &widget_product(),
            &["amazon".to_owned(), "walmart".to_owned()],
            None,
        )
        .await
        .expect("compare");

    // Cheapest first; the generic phone case fails the relevance gate.
    assert_eq!(report.searched_retailers, 2);
    assert_eq!(report.results.len(), 3);
    assert_eq!(report.results[0].listing.retailer, "Walmart");
    assert_eq!(report.results[0].listing.price, 17.88);
    assert_eq!(report.results[1].listing.price, 19.49);
    assert_eq!(report.results[2].listing.price, 24.99);
    assert_eq!(report.best_price, Some(17.88));
    assert!(report
        .results
        .iter()
        .all(|r| !r.listing.title.contains("Phone Case")));
}

#[tokio::test]
async fn unknown_retailer_keys_are_skipped() {
    let walmart = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(walmart_page()))
        .mount(&walmart)
        .await;

    let config = CompareConfig {
        walmart_url: Some(walmart.uri()),
        ..CompareConfig::default()
    };
    let comparer = config.comparer().expect("build comparer");

    let report = comparer
        .compare(
            "tester",
            &widget_product(),
            &["target".to_owned(), "walmart".to_owned()],
            None,
        )
        .await
        .expect("compare");

    assert_eq!(report.searched_retailers, 1);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].listing.retailer, "Walmart");
}

#[tokio::test]
async fn slow_retailer_is_absorbed_as_timeout() {
    let amazon = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/s"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(amazon_page())
                .set_delay(Duration::from_millis(750)),
        )
        .mount(&amazon)
        .await;
    let walmart = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(walmart_page()))
        .mount(&walmart)
        .await;

    let config = CompareConfig {
        amazon_url: Some(amazon.uri()),
        walmart_url: Some(walmart.uri()),
        per_retailer_timeout_ms: 100,
        ..CompareConfig::default()
    };
    let comparer = config.comparer().expect("build comparer");

    let report = comparer
        .compare(
            "tester",
            &widget_product(),
            &["amazon".to_owned(), "walmart".to_owned()],
            None,
        )
        .await
        .expect("compare");

    // Amazon timed out but was still searched; only Walmart contributed.
    assert_eq!(report.searched_retailers, 2);
    assert_eq!(report.results.len(), 1);
    assert_eq!(report.results[0].listing.retailer, "Walmart");
}

#[tokio::test]
async fn rate_limited_caller_is_rejected_before_any_search() {
    let registry = ScraperRegistry::new(Vec::new());
    let comparer = PriceComparer::new(
        registry,
        RateGovernor::new(1, Duration::from_secs(60)),
        Duration::from_secs(5),
        5,
    );

    let product = widget_product();
    comparer
        .compare("burst", &product, &[], None)
        .await
        .expect("first search admitted");
    let err = comparer
        .compare("burst", &product, &[], None)
        .await
        .expect_err("second search rejected");
    assert!(matches!(err, CompareError::RateLimited { caller } if caller == "burst"));

    // A different caller has its own window.
    comparer
        .compare("other", &product, &[], None)
        .await
        .expect("other caller admitted");
}
