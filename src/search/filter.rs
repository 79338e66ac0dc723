//! Filter evaluator: conjunction of text, category, brand and price predicates.

use crate::model::types::Record;
use crate::search::query::SearchSpecification;

/// Predicates compiled from a [`SearchSpecification`], lowercased once up front.
#[derive(Debug, Clone)]
pub struct RecordFilter {
    query: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    min_price: f64,
    max_price: f64,
}

impl RecordFilter {
    pub fn from_spec(spec: &SearchSpecification) -> Self {
        let lowered = |s: &str| (!s.is_empty()).then(|| s.to_lowercase());
        Self {
            query: lowered(&spec.query),
            category: lowered(&spec.category),
            brand: lowered(&spec.brand),
            min_price: spec.min_price as f64,
            max_price: spec.max_price as f64,
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.matches_text(record)
            && self.matches_category(record)
            && self.matches_brand(record)
            && self.matches_price(record)
    }

    /// Substring match against name, description, category, brand or any tag.
    fn matches_text(&self, record: &Record) -> bool {
        let Some(needle) = self.query.as_deref() else {
            return true;
        };
        let hit = |field: &str| field.to_lowercase().contains(needle);
        hit(&record.name)
            || hit(&record.description)
            || hit(&record.category)
            || record.brand.as_deref().is_some_and(hit)
            || record.tags.iter().any(|tag| hit(tag))
    }

    fn matches_category(&self, record: &Record) -> bool {
        self.category
            .as_deref()
            .is_none_or(|wanted| record.category.to_lowercase() == wanted)
    }

    fn matches_brand(&self, record: &Record) -> bool {
        self.brand.as_deref().is_none_or(|wanted| {
            record
                .brand
                .as_deref()
                .is_some_and(|brand| brand.to_lowercase() == wanted)
        })
    }

    /// Records without a price always pass.
    fn matches_price(&self, record: &Record) -> bool {
        record
            .price
            .is_none_or(|price| price >= self.min_price && price <= self.max_price)
    }
}

/// Stable filter: matching records keep their store order.
pub fn filter_records<'a>(records: &'a [Record], spec: &SearchSpecification) -> Vec<&'a Record> {
    let filter = RecordFilter::from_spec(spec);
    records.iter().filter(|r| filter.matches(r)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn catalog() -> Vec<Record> {
        let now = Utc::now();
        vec![
            Record::new("1", "Smart TechMaster Laptop", "Electronics", now)
                .with_description("Energy efficient")
                .with_brand("TechMaster")
                .with_price(50.0)
                .with_tags(["new", "sale"]),
            Record::new("2", "Deluxe StyleCo Shirt", "Clothing", now)
                .with_description("Modern design")
                .with_brand("StyleCo")
                .with_price(150.0)
                .with_tags(["bestseller"]),
            Record::new("3", "Ultra BookWorm Novel", "Books", now)
                .with_description("Easy to use")
                .with_brand("BookWorm")
                .with_price(250.0)
                .with_tags(["eco-friendly"]),
            Record::new("4", "Search Result 4", "Health", now).with_description("An article"),
        ]
    }

    fn ids(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn empty_spec_matches_everything_in_order() {
        let records = catalog();
        let hits = filter_records(&records, &SearchSpecification::default());
        assert_eq!(ids(&hits), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn text_query_is_case_insensitive_across_fields() {
        let records = catalog();
        let by = |q: &str| ids(&filter_records(&records, &SearchSpecification::default().with_query(q)));
        assert_eq!(by("LAPTOP"), vec!["1"]);
        assert_eq!(by("modern"), vec!["2"]);
        assert_eq!(by("books"), vec!["3"]);
        assert_eq!(by("stylEco"), vec!["2"]);
        assert_eq!(by("eco"), vec!["2", "3"]);
        assert_eq!(by("best"), vec!["2"]);
        assert!(by("zzz").is_empty());
    }

    #[test]
    fn category_and_brand_are_exact_but_case_insensitive() {
        let records = catalog();
        let spec = SearchSpecification::default().with_category("electronics");
        assert_eq!(ids(&filter_records(&records, &spec)), vec!["1"]);

        let spec = SearchSpecification::default().with_category("electro");
        assert!(filter_records(&records, &spec).is_empty());

        let spec = SearchSpecification::default().with_brand("BOOKWORM");
        assert_eq!(ids(&filter_records(&records, &spec)), vec!["3"]);
    }

    #[test]
    fn brand_filter_excludes_records_without_brand() {
        let records = catalog();
        let spec = SearchSpecification::default().with_brand("TechMaster");
        assert!(!ids(&filter_records(&records, &spec)).contains(&"4".to_string()));
    }

    #[test]
    fn price_range_is_inclusive_and_priceless_records_pass() {
        let records = catalog();
        let spec = SearchSpecification::default().with_price_range(100, 200);
        assert_eq!(ids(&filter_records(&records, &spec)), vec!["2", "4"]);

        let spec = SearchSpecification::default().with_price_range(150, 250);
        assert_eq!(ids(&filter_records(&records, &spec)), vec!["2", "3", "4"]);
    }

    #[test]
    fn predicates_compose_as_and() {
        let records = catalog();
        let spec = SearchSpecification::default()
            .with_query("e")
            .with_category("Clothing")
            .with_price_range(0, 100);
        assert!(filter_records(&records, &spec).is_empty());
    }
}
