//! Facet summarizer.
//!
//! Facets describe the whole store, never the filtered subset, so a UI can
//! keep offering every category and brand even when the current filters
//! match nothing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::model::types::Record;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    /// Distinct categories, first-seen order, original case.
    pub categories: Vec<String>,
    /// Distinct brands, first-seen order; records without a brand are skipped.
    pub brands: Vec<String>,
    /// `{0, 0}` when no record carries a price.
    pub price_range: PriceRange,
}

pub fn summarize(records: &[Record]) -> Facets {
    let mut categories = Vec::new();
    let mut seen_categories = HashSet::new();
    let mut brands = Vec::new();
    let mut seen_brands = HashSet::new();
    let mut range: Option<PriceRange> = None;

    for record in records {
        if seen_categories.insert(record.category.as_str()) {
            categories.push(record.category.clone());
        }
        if let Some(brand) = record.brand.as_deref()
            && seen_brands.insert(brand)
        {
            brands.push(brand.to_string());
        }
        if let Some(price) = record.price {
            range = Some(match range {
                Some(r) => PriceRange {
                    min: r.min.min(price),
                    max: r.max.max(price),
                },
                None => PriceRange {
                    min: price,
                    max: price,
                },
            });
        }
    }

    Facets {
        categories,
        brands,
        price_range: range.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn collects_distinct_values_in_store_order() {
        let now = Utc::now();
        let records = vec![
            Record::new("1", "a", "Toys", now).with_brand("ToyWorld").with_price(120.0),
            Record::new("2", "b", "Books", now).with_brand("BookWorm").with_price(899.0),
            Record::new("3", "c", "Toys", now).with_brand("ToyWorld").with_price(450.0),
            Record::new("4", "d", "Health", now),
        ];
        let facets = summarize(&records);
        assert_eq!(facets.categories, vec!["Toys", "Books", "Health"]);
        assert_eq!(facets.brands, vec!["ToyWorld", "BookWorm"]);
        assert_eq!(facets.price_range, PriceRange { min: 120.0, max: 899.0 });
    }

    #[test]
    fn priceless_store_reports_zero_range() {
        let records = vec![Record::new("1", "a", "Tech", Utc::now())];
        let facets = summarize(&records);
        assert_eq!(facets.price_range, PriceRange::default());
        assert!(facets.brands.is_empty());
    }

    #[test]
    fn empty_store_has_empty_facets() {
        assert_eq!(summarize(&[]), Facets::default());
    }
}
