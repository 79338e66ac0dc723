//! Sort engine.
//!
//! Descending order negates the comparator instead of reversing the sorted
//! output, so records with equal keys keep their filtered order in both
//! directions. `sort_by` is a stable merge sort.

use std::cmp::Ordering;

use crate::model::types::Record;
use crate::search::collate::locale_cmp;
use crate::search::query::{SortKey, SortOrder};

/// Missing values order before present ones.
fn cmp_optional_f64(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Ascending comparator for `key`.
pub fn compare(a: &Record, b: &Record, key: SortKey) -> Ordering {
    match key {
        SortKey::Name => locale_cmp(&a.name, &b.name),
        SortKey::Price => cmp_optional_f64(a.price, b.price),
        SortKey::Rating => cmp_optional_f64(a.rating, b.rating),
        SortKey::Date => a
            .created_at
            .timestamp_millis()
            .cmp(&b.created_at.timestamp_millis()),
    }
}

pub fn sort_records(records: &mut [&Record], key: SortKey, order: SortOrder) {
    records.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn priced(id: &str, price: f64) -> Record {
        Record::new(id, id, "Books", Utc::now()).with_price(price)
    }

    fn order_of(records: &[&Record]) -> Vec<String> {
        records.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn descending_keeps_tie_order() {
        let records = vec![priced("A", 30.0), priced("B", 30.0), priced("C", 10.0)];
        let mut refs: Vec<&Record> = records.iter().collect();
        sort_records(&mut refs, SortKey::Price, SortOrder::Desc);
        assert_eq!(order_of(&refs), vec!["A", "B", "C"]);

        sort_records(&mut refs, SortKey::Price, SortOrder::Asc);
        assert_eq!(order_of(&refs), vec!["C", "A", "B"]);
    }

    #[test]
    fn name_sort_is_locale_aware() {
        let now = Utc::now();
        let records = vec![
            Record::new("1", "beta", "x", now),
            Record::new("2", "Alpha", "x", now),
            Record::new("3", "Charlie", "x", now),
        ];
        let mut refs: Vec<&Record> = records.iter().collect();
        sort_records(&mut refs, SortKey::Name, SortOrder::Asc);
        assert_eq!(order_of(&refs), vec!["2", "1", "3"]);
    }

    #[test]
    fn date_sort_puts_earliest_first_when_ascending() {
        let records = vec![
            Record::new("new", "n", "x", Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()),
            Record::new("old", "o", "x", Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
        ];
        let mut refs: Vec<&Record> = records.iter().collect();
        sort_records(&mut refs, SortKey::Date, SortOrder::Asc);
        assert_eq!(order_of(&refs), vec!["old", "new"]);
        sort_records(&mut refs, SortKey::Date, SortOrder::Desc);
        assert_eq!(order_of(&refs), vec!["new", "old"]);
    }

    #[test]
    fn missing_rating_sorts_first_ascending() {
        let now = Utc::now();
        let records = vec![
            Record::new("rated", "r", "x", now).with_rating(4.5),
            Record::new("unrated", "u", "x", now),
        ];
        let mut refs: Vec<&Record> = records.iter().collect();
        sort_records(&mut refs, SortKey::Rating, SortOrder::Asc);
        assert_eq!(order_of(&refs), vec!["unrated", "rated"]);
        sort_records(&mut refs, SortKey::Rating, SortOrder::Desc);
        assert_eq!(order_of(&refs), vec!["rated", "unrated"]);
    }
}
