//! Product-page metadata.

use serde::{Deserialize, Serialize};

/// Metadata scraped from a product detail page.
///
/// Every field is optional. A page that renders only a title still produces a
/// usable record; absence is the normal state for fields the marketplace hides
/// behind lazy-loaded widgets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub title: Option<String>,
    /// Price as displayed, currency prefix included (e.g. `"Rp125.000"`).
    pub price: Option<String>,
    /// Average star rating in `[0.0, 5.0]`.
    pub average_rating: Option<f32>,
    pub total_review_count: Option<u64>,
    pub shop_name: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    /// Second-to-last breadcrumb segment.
    pub category: Option<String>,
}

impl ProductMetadata {
    /// Number of populated fields, used in run summaries.
    #[must_use]
    pub fn populated_fields(&self) -> usize {
        [
            self.title.is_some(),
            self.price.is_some(),
            self.average_rating.is_some(),
            self.total_review_count.is_some(),
            self.shop_name.is_some(),
            self.image_url.is_some(),
            self.description.is_some(),
            self.category.is_some(),
        ]
        .into_iter()
        .filter(|present| *present)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metadata_has_no_fields() {
        assert_eq!(ProductMetadata::default().populated_fields(), 0);
    }

    #[test]
    fn populated_fields_counts_present_values() {
        let meta = ProductMetadata {
            title: Some("Kopi Arabika 250g".to_string()),
            average_rating: Some(4.8),
            category: Some("Kopi".to_string()),
            ..ProductMetadata::default()
        };
        assert_eq!(meta.populated_fields(), 3);
    }

    #[test]
    fn absent_fields_serialize_as_null() {
        let json = serde_json::to_value(ProductMetadata::default()).unwrap();
        assert!(json["title"].is_null());
        assert!(json["total_review_count"].is_null());
    }
}
