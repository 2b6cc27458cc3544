use super::*;
use shelfscan_core::ProductIdentifier;

fn product(brand: Option<&str>, name: &str) -> CanonicalProduct {
    CanonicalProduct {
        name: Some(name.to_owned()),
        brand: brand.map(str::to_owned),
        ..CanonicalProduct::default()
    }
}

fn listing(title: &str, price: f64) -> RetailerListing {
    RetailerListing {
        retailer: "Amazon".to_owned(),
        title: title.to_owned(),
        price,
        currency: "USD".to_owned(),
        url: None,
        image_url: None,
    }
}

#[test]
fn branded_title_scores_high() {
    let product = product(Some("Sony"), "WH-1000XM4 Wireless Headphones");
    let confidence = match_confidence("Sony WH-1000XM4 Wireless Headphones", &product);
    assert!(confidence >= 60, "got {confidence}");
    // Brand + all name words + verbatim name: the full 100.
    assert_eq!(confidence, 100);
}

#[test]
fn unrelated_title_fails_the_gate() {
    let product = product(Some("Sony"), "WH-1000XM4 Wireless Headphones");
    assert!(!is_relevant("Generic Bluetooth Earbuds", &product));

    let result = score_listing(&product, listing("Generic Bluetooth Earbuds", 9.99));
    assert!(!result.accepted);
    assert_eq!(result.confidence, 0);
}

#[test]
fn brand_match_alone_is_relevant() {
    let product = product(Some("Sony"), "WH-1000XM4 Wireless Headphones");
    assert!(is_relevant("sony soundbar with subwoofer", &product));
}

#[test]
fn half_of_the_name_words_is_relevant_without_a_brand() {
    let product = product(None, "Stainless Travel Mug Lid");
    // 2 of 4 tokens present: exactly the 50% threshold.
    assert!(is_relevant("Insulated travel mug, 16oz", &product));
    // 1 of 4 tokens is below it.
    assert!(!is_relevant("Ceramic mug gift set", &product));
}

#[test]
fn brand_matching_is_case_insensitive() {
    let product = product(Some("ACME"), "Widget Deluxe");
    assert_eq!(match_confidence("acme widget deluxe kit", &product), 100);
}

#[test]
fn partial_word_overlap_scores_proportionally() {
    let product = product(None, "Stainless Travel Mug Lid");
    // 2 of 4 tokens, no brand, no verbatim name: 40 * 0.5 = 20.
    assert_eq!(match_confidence("Insulated travel mug, 16oz", &product), 20);
}

#[test]
fn search_query_strips_punctuation_and_joins_parts() {
    let mut product = product(Some("Acme"), "Widget (Deluxe) 2-Pack");
    product.identifiers.push(ProductIdentifier {
        kind: "upc".to_owned(),
        value: "012345678905".to_owned(),
    });
    assert_eq!(
        build_search_query(&product),
        "Acme Widget Deluxe 2 Pack 012345678905"
    );
}

#[test]
fn accepted_listing_keeps_its_confidence() {
    let product = product(Some("Sony"), "WH-1000XM4 Wireless Headphones");
    let result = score_listing(&product, listing("Sony WH-1000XM4 headphones, black", 248.0));
    assert!(result.accepted);
    assert!(result.confidence > 0);
}

#[test]
#[should_panic(expected = "canonical product with a name")]
fn matching_a_nameless_product_is_a_caller_bug() {
    let product = CanonicalProduct::default();
    let _ = is_relevant("anything", &product);
}
