//! Paginator: slices the ordered result set and reports page metadata.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Matching records before slicing.
    pub total_count: usize,
    /// `ceil(total_count / page_size)`; 0 when nothing matched.
    pub total_pages: usize,
    pub current_page: usize,
    pub page_size: usize,
    pub has_more: bool,
    pub next_page: Option<usize>,
}

impl Pagination {
    pub fn compute(total_count: usize, page: usize, page_size: usize) -> Self {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total_pages = total_count.div_ceil(page_size);
        let has_more = page < total_pages;
        Self {
            total_count,
            total_pages,
            current_page: page,
            page_size,
            has_more,
            next_page: has_more.then_some(page + 1),
        }
    }
}

/// Returns `items[(page-1)*size .. page*size]`, clamped; out-of-range pages are empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.max(1).saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = start.saturating_add(page_size).min(items.len());
    &items[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_partial_page_has_no_next() {
        let p = Pagination::compute(15, 2, 10);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_more);
        assert_eq!(p.next_page, None);
    }

    #[test]
    fn first_page_points_to_second() {
        let p = Pagination::compute(15, 1, 10);
        assert!(p.has_more);
        assert_eq!(p.next_page, Some(2));
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let p = Pagination::compute(0, 1, 10);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_more);
    }

    #[test]
    fn slices_are_clamped() {
        let items: Vec<u32> = (0..15).collect();
        assert_eq!(page_slice(&items, 1, 10), &items[0..10]);
        assert_eq!(page_slice(&items, 2, 10), &items[10..15]);
        assert!(page_slice(&items, 3, 10).is_empty());
        assert!(page_slice(&items, usize::MAX, 10).is_empty());
    }
}
