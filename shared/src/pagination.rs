// In-memory pagination over a list of rows, one-based page numbers.

pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;

/// Page window over an owned list of items.
///
/// `current_page` always stays within `1..=max(1, total_pages())`. Mutators report
/// whether they moved instead of failing.
#[derive(Debug, Clone)]
pub struct Paginator<T> {
    items: Vec<T>,
    items_per_page: usize,
    current_page: usize,
}

impl<T> Paginator<T> {
    /// A page size of 0 is treated as 1.
    pub fn new(items: Vec<T>, items_per_page: usize) -> Self {
        Self {
            items,
            items_per_page: items_per_page.max(1),
            current_page: 1,
        }
    }

    pub fn with_default_page_size(items: Vec<T>) -> Self {
        Self::new(items, DEFAULT_ITEMS_PER_PAGE)
    }

    /// `ceil(len / items_per_page)`; an empty list has 0 pages.
    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.items_per_page)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items of the current page, clipped to the list bounds.
    pub fn page_items(&self) -> &[T] {
        let start = (self.current_page - 1)
            .saturating_mul(self.items_per_page)
            .min(self.items.len());
        let end = start.saturating_add(self.items_per_page).min(self.items.len());
        &self.items[start..end]
    }

    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    pub fn prev_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    /// Jumps to `page` when `1 <= page <= total_pages()`; otherwise leaves the state untouched.
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page >= 1 && page <= self.total_pages() {
            self.current_page = page;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(n: usize) -> Vec<usize> {
        (0..n).collect()
    }

    #[test]
    fn test_total_pages_is_ceiling() {
        for len in 0..40 {
            for per_page in 1..12 {
                let pager = Paginator::new(numbers(len), per_page);
                assert_eq!(pager.total_pages(), (len + per_page - 1) / per_page);
            }
        }
    }

    #[test]
    fn test_empty_list_has_zero_pages() {
        let mut pager: Paginator<u8> = Paginator::with_default_page_size(Vec::new());
        assert_eq!(pager.total_pages(), 0);
        assert_eq!(pager.current_page(), 1);
        assert!(pager.page_items().is_empty());
        assert!(!pager.next_page());
        assert!(!pager.prev_page());
        assert!(!pager.go_to_page(1));
    }

    #[test]
    fn test_zero_page_size_is_clamped() {
        let pager = Paginator::new(numbers(3), 0);
        assert_eq!(pager.items_per_page(), 1);
        assert_eq!(pager.total_pages(), 3);
    }

    #[test]
    fn test_page_items_slices() {
        let items = numbers(23);
        let mut pager = Paginator::new(items.clone(), 10);
        assert_eq!(pager.page_items(), &items[0..10]);
        assert!(pager.go_to_page(2));
        assert_eq!(pager.page_items(), &items[10..20]);
        assert!(pager.go_to_page(3));
        assert_eq!(pager.page_items(), &items[20..23]);
    }

    #[test]
    fn test_next_and_prev() {
        let mut pager = Paginator::new(numbers(25), 10);
        assert!(!pager.prev_page());
        assert!(pager.next_page());
        assert!(pager.next_page());
        assert_eq!(pager.current_page(), 3);
        assert!(!pager.next_page());
        assert_eq!(pager.current_page(), 3);
        assert!(pager.prev_page());
        assert_eq!(pager.current_page(), 2);
    }

    #[test]
    fn test_go_to_page_bounds() {
        let mut pager = Paginator::new(numbers(25), 10);
        assert!(!pager.go_to_page(0));
        assert!(!pager.go_to_page(4));
        assert_eq!(pager.current_page(), 1);
        assert!(pager.go_to_page(3));
        assert_eq!(pager.current_page(), 3);
        assert!(!pager.go_to_page(99));
        assert_eq!(pager.current_page(), 3);
    }
}
