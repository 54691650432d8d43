use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A product listing scraped from one online store, normalized for
/// comparison across stores.
///
/// Records are constructed once per successful extraction and treated as
/// immutable afterwards; they are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Current sale price. Extraction leaves this `None` when no price
    /// could be parsed; validation rejects such records downstream.
    pub current_price: Option<f64>,
    /// Pre-discount price, when the store shows one.
    pub original_price: Option<f64>,
    /// Currency symbol as displayed by the store (e.g. `"$"`).
    pub currency: Option<String>,
    pub store_name: String,
    /// Normalized store host, e.g. `"amazon.com"`.
    pub store_id: String,
    pub image_url: Option<String>,
    /// Canonical product page URL.
    pub product_url: String,
    /// Whether the store currently offers the product for purchase.
    pub available: bool,
    pub stock_quantity: Option<u32>,
    /// Customer rating on a 0–5 scale.
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub last_updated: DateTime<Utc>,
    /// Store-assigned product identifier, when one could be extracted.
    pub product_id: Option<String>,
    pub brand: Option<String>,
    pub category: Option<String>,
}

impl ProductRecord {
    /// Rating with absent values mapped to `0.0`.
    #[must_use]
    pub fn safe_rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Review count with absent values mapped to `0`.
    #[must_use]
    pub fn safe_review_count(&self) -> u32 {
        self.review_count.unwrap_or(0)
    }

    /// Display price, e.g. `"$129.99"`. Returns `"N/A"` when no price was
    /// extracted. The currency symbol defaults to `"$"` when the store did
    /// not provide one.
    #[must_use]
    pub fn formatted_price(&self) -> String {
        match self.current_price {
            Some(price) => {
                let symbol = self
                    .currency
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .unwrap_or("$");
                format!("{symbol}{price:.2}")
            }
            None => "N/A".to_string(),
        }
    }

    /// `true` when both prices are present and the current price is below
    /// the original.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        matches!(
            (self.original_price, self.current_price),
            (Some(original), Some(current)) if current < original
        )
    }

    /// Discount as a percentage of the original price; `0.0` when
    /// [`Self::has_discount`] is false.
    #[must_use]
    pub fn discount_percentage(&self) -> f64 {
        if !self.has_discount() {
            return 0.0;
        }
        let (Some(original), Some(current)) = (self.original_price, self.current_price) else {
            return 0.0;
        };
        (original - current) / original * 100.0
    }

    /// Minimum shape for a record to be usable downstream: non-blank name,
    /// URL, and store name, and a positive current price.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.product_url.trim().is_empty()
            && !self.store_name.trim().is_empty()
            && self.current_price.is_some_and(|p| p > 0.0)
    }
}

/// Identity: two records refer to the same listing when their store-assigned
/// product IDs match; when either side has no ID, fall back to the
/// (URL, store) pair.
impl PartialEq for ProductRecord {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (&self.product_id, &other.product_id) {
            return a == b;
        }
        self.product_url == other.product_url && self.store_name == other.store_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(name: &str, price: Option<f64>) -> ProductRecord {
        ProductRecord {
            name: name.to_string(),
            current_price: price,
            original_price: None,
            currency: None,
            store_name: "Amazon".to_string(),
            store_id: "amazon.com".to_string(),
            image_url: None,
            product_url: "https://www.amazon.com/dp/B0TEST".to_string(),
            available: true,
            stock_quantity: None,
            rating: None,
            review_count: None,
            last_updated: Utc::now(),
            product_id: None,
            brand: None,
            category: None,
        }
    }

    #[test]
    fn safe_rating_defaults_to_zero() {
        assert!((make_record("X", Some(1.0)).safe_rating() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn safe_rating_passes_through_value() {
        let mut r = make_record("X", Some(1.0));
        r.rating = Some(4.5);
        assert!((r.safe_rating() - 4.5).abs() < f64::EPSILON);
    }

    #[test]
    fn safe_review_count_defaults_to_zero() {
        assert_eq!(make_record("X", Some(1.0)).safe_review_count(), 0);
    }

    #[test]
    fn formatted_price_uses_default_symbol() {
        let r = make_record("X", Some(129.99));
        assert_eq!(r.formatted_price(), "$129.99");
    }

    #[test]
    fn formatted_price_uses_store_currency() {
        let mut r = make_record("X", Some(99.5));
        r.currency = Some("€".to_string());
        assert_eq!(r.formatted_price(), "€99.50");
    }

    #[test]
    fn formatted_price_empty_currency_falls_back_to_dollar() {
        let mut r = make_record("X", Some(10.0));
        r.currency = Some(String::new());
        assert_eq!(r.formatted_price(), "$10.00");
    }

    #[test]
    fn formatted_price_absent_is_na() {
        assert_eq!(make_record("X", None).formatted_price(), "N/A");
    }

    #[test]
    fn has_discount_requires_both_prices() {
        let mut r = make_record("X", Some(80.0));
        assert!(!r.has_discount());
        r.original_price = Some(100.0);
        assert!(r.has_discount());
    }

    #[test]
    fn has_discount_false_when_current_not_lower() {
        let mut r = make_record("X", Some(100.0));
        r.original_price = Some(100.0);
        assert!(!r.has_discount());
        r.original_price = Some(90.0);
        assert!(!r.has_discount());
    }

    #[test]
    fn discount_percentage_computed_only_with_discount() {
        let mut r = make_record("X", Some(80.0));
        assert!((r.discount_percentage() - 0.0).abs() < f64::EPSILON);
        r.original_price = Some(100.0);
        assert!((r.discount_percentage() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn is_valid_requires_positive_price() {
        assert!(make_record("X", Some(1.0)).is_valid());
        assert!(!make_record("X", Some(0.0)).is_valid());
        assert!(!make_record("X", None).is_valid());
    }

    #[test]
    fn is_valid_requires_non_blank_name() {
        assert!(!make_record("   ", Some(1.0)).is_valid());
    }

    #[test]
    fn is_valid_requires_non_blank_store_and_url() {
        let mut r = make_record("X", Some(1.0));
        r.store_name = " ".to_string();
        assert!(!r.is_valid());

        let mut r = make_record("X", Some(1.0));
        r.product_url = String::new();
        assert!(!r.is_valid());
    }

    #[test]
    fn identity_prefers_product_id() {
        let mut a = make_record("A", Some(1.0));
        let mut b = make_record("B", Some(2.0));
        a.product_id = Some("B0X".to_string());
        b.product_id = Some("B0X".to_string());
        b.product_url = "https://other.example/item".to_string();
        assert_eq!(a, b);

        b.product_id = Some("B0Y".to_string());
        b.product_url = a.product_url.clone();
        assert_ne!(a, b, "matching URL must not override differing IDs");
    }

    #[test]
    fn identity_falls_back_to_url_and_store() {
        let a = make_record("A", Some(1.0));
        let mut b = make_record("B", Some(2.0));
        assert_eq!(a, b);

        b.store_name = "eBay".to_string();
        assert_ne!(a, b);
    }

    #[test]
    fn serde_roundtrip() {
        let record = make_record("Hi Boy Blood Orange", Some(12.99));
        let json = serde_json::to_string(&record).expect("serialization failed");
        let decoded: ProductRecord = serde_json::from_str(&json).expect("deserialization failed");
        assert_eq!(decoded.name, record.name);
        assert_eq!(decoded.current_price, record.current_price);
        assert_eq!(decoded.store_id, "amazon.com");
    }
}
