//! Pull-based paging over a projected item list

use crate::config::DEFAULT_PAGE_SIZE;

/// Position of the next page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor(usize);

impl Cursor {
    /// Cursor at the first item
    #[inline]
    #[must_use]
    pub fn start() -> Self {
        Self(0)
    }

    /// Index of the first item of the page
    #[inline]
    #[must_use]
    pub fn offset(self) -> usize {
        self.0
    }
}

/// Splits a list into fixed-size pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
}

impl Paginator {
    /// Paginator yielding `page_size` items per page (at least one)
    #[inline]
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
        }
    }

    /// Items per page
    #[inline]
    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Items at `cursor` and the cursor of the following page, if any
    #[must_use]
    pub fn next_batch<'a, T>(&self, items: &'a [T], cursor: Cursor) -> (&'a [T], Option<Cursor>) {
        let start = cursor.0.min(items.len());
        let end = start.saturating_add(self.page_size).min(items.len());
        let next = (end < items.len()).then_some(Cursor(end));
        (&items[start..end], next)
    }

    /// Number of pages for `len` items
    #[inline]
    #[must_use]
    pub fn page_count(&self, len: usize) -> usize {
        len.div_ceil(self.page_size)
    }
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn pages_cover_everything_once() {
        let items: Vec<u32> = (0..250).collect();
        let paginator = Paginator::default();
        let mut cursor = Some(Cursor::start());
        let mut seen = Vec::new();
        let mut pages = 0;
        while let Some(c) = cursor {
            let (page, next) = paginator.next_batch(&items, c);
            assert!(page.len() <= 100);
            seen.extend_from_slice(page);
            cursor = next;
            pages += 1;
        }
        assert_eq!(seen, items);
        assert_eq!(pages, 3);
        assert_eq!(paginator.page_count(items.len()), 3);
    }

    #[test]
    fn exact_multiple_has_no_trailing_cursor() {
        let items = [1, 2, 3, 4];
        let paginator = Paginator::new(2);
        let (first, next) = paginator.next_batch(&items, Cursor::start());
        assert_eq!(first, &[1, 2]);
        let (second, next) = paginator.next_batch(&items, next.unwrap());
        assert_eq!(second, &[3, 4]);
        assert!(next.is_none());
    }

    #[test]
    fn empty_and_out_of_range() {
        let paginator = Paginator::new(0);
        assert_eq!(paginator.page_size(), 1);
        let empty: [u8; 0] = [];
        assert_eq!(paginator.next_batch(&empty, Cursor::start()), (&empty[..], None));
        assert!(paginator.next_batch(&[1], Cursor(5)).0.is_empty());
    }

    proptest! {
        #[test]
        fn paging_is_lossless(len in 0usize..400, size in 0usize..64) {
            let items: Vec<usize> = (0..len).collect();
            let paginator = Paginator::new(size);
            let mut cursor = Some(Cursor::start());
            let mut seen = Vec::new();
            let mut pages = 0;
            while let Some(c) = cursor {
                let (page, next) = paginator.next_batch(&items, c);
                prop_assert!(page.len() <= paginator.page_size());
                seen.extend_from_slice(page);
                cursor = next;
                pages += 1;
            }
            prop_assert_eq!(seen, items);
            prop_assert_eq!(pages, paginator.page_count(len).max(1));
        }
    }
}
