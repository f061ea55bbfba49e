//! Page-number pagination over ordered listings.
//!
//! The same window arithmetic serves both store-level fetches (`PageWindow`)
//! and slicing of an in-memory sequence (`paginate`).

use std::num::{IntErrorKind, NonZeroUsize};

use serde::Serialize;

/// Number of items per page. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize(NonZeroUsize);

impl PageSize {
    pub fn new(size: usize) -> Option<Self> {
        NonZeroUsize::new(size).map(Self)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self(NonZeroUsize::new(10).unwrap_or(NonZeroUsize::MIN))
    }
}

/// 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PageNumber(NonZeroUsize);

impl PageNumber {
    pub const FIRST: PageNumber = PageNumber(NonZeroUsize::MIN);

    pub fn new(number: usize) -> Option<Self> {
        NonZeroUsize::new(number).map(Self)
    }

    /// Reads the raw `page` query value. Absent, non-numeric and zero values all
    /// fall back to the first page; numbers too large for `usize` saturate and
    /// so land past the last page.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| match value.trim().parse::<usize>() {
            Ok(number) => Self::new(number),
            Err(err) if *err.kind() == IntErrorKind::PosOverflow => Self::new(usize::MAX),
            Err(_) => None,
        })
        .unwrap_or(Self::FIRST)
    }

    pub fn get(&self) -> usize {
        self.0.get()
    }
}

impl Default for PageNumber {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Offset/limit pair covering `[(number - 1) * size, number * size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub size: PageSize,
    pub number: PageNumber,
}

impl PageWindow {
    pub fn new(size: PageSize, number: PageNumber) -> Self {
        Self { size, number }
    }

    pub fn offset(&self) -> usize {
        (self.number.get() - 1).saturating_mul(self.size.get())
    }

    pub fn limit(&self) -> usize {
        self.size.get()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub page_size: usize,
    pub total_count: usize,
    pub num_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_page_number: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_number: Option<usize>,
}

impl<T> Page<T> {
    /// Builds a page from items already cut to `window` out of `total_count` matches.
    pub fn from_window(items: Vec<T>, total_count: usize, window: PageWindow) -> Self {
        let number = window.number.get();
        let num_pages = total_count.div_ceil(window.size.get());
        let has_previous = number > 1;
        let has_next = number < num_pages;

        Self {
            items,
            number,
            page_size: window.size.get(),
            total_count,
            num_pages,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| number - 1),
            next_page_number: has_next.then(|| number + 1),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slices an ordered sequence. A page past the end is empty, never an error.
pub fn paginate<T>(sequence: Vec<T>, size: PageSize, number: PageNumber) -> Page<T> {
    let window = PageWindow::new(size, number);
    let total_count = sequence.len();
    let items = sequence
        .into_iter()
        .skip(window.offset())
        .take(window.limit())
        .collect();
    Page::from_window(items, total_count, window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(n: usize) -> PageSize {
        PageSize::new(n).expect("non-zero size")
    }

    fn page(n: usize) -> PageNumber {
        PageNumber::new(n).expect("non-zero page")
    }

    #[test]
    fn page_number_falls_back_to_first() {
        assert_eq!(PageNumber::parse(None), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("abc")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("0")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("-3")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("")), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("4")).get(), 4);
    }

    #[test]
    fn oversized_page_number_is_past_the_end() {
        let number = PageNumber::parse(Some("99999999999999999999999"));
        assert_eq!(number.get(), usize::MAX);

        let page = paginate((0..15).collect::<Vec<u32>>(), size(10), number);
        assert!(page.is_empty());
        assert!(!page.has_next);
        assert_eq!(page.num_pages, 2);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert!(PageSize::new(0).is_none());
        assert_eq!(PageSize::default().get(), 10);
    }

    #[test]
    fn window_offsets() {
        let window = PageWindow::new(size(10), page(3));
        assert_eq!(window.offset(), 20);
        assert_eq!(window.limit(), 10);
    }

    #[test]
    fn fifteen_items_split_ten_and_five() {
        let items: Vec<u32> = (0..15).collect();

        let first = paginate(items.clone(), size(10), page(1));
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 2);
        assert!(!first.has_previous);
        assert!(first.has_next);
        assert_eq!(first.next_page_number, Some(2));

        let second = paginate(items.clone(), size(10), page(2));
        assert_eq!(second.items, vec![10, 11, 12, 13, 14]);
        assert!(second.has_previous);
        assert!(!second.has_next);

        let third = paginate(items, size(10), page(3));
        assert!(third.is_empty());
        assert_eq!(third.total_count, 15);
        assert!(!third.has_next);
    }

    #[test]
    fn exact_multiple_has_no_trailing_page() {
        let items: Vec<u32> = (0..10).collect();
        let first = paginate(items.clone(), size(10), page(1));
        assert_eq!(first.len(), 10);
        assert_eq!(first.num_pages, 1);
        assert!(!first.has_next);

        assert!(paginate(items, size(10), page(2)).is_empty());
    }

    #[test]
    fn boundary_item_lands_on_second_page_once() {
        let items: Vec<u32> = (0..11).collect();
        let first = paginate(items.clone(), size(10), page(1));
        let second = paginate(items, size(10), page(2));
        assert_eq!(second.items, vec![10]);
        assert!(!first.items.contains(&10));
    }

    #[test]
    fn pages_cover_sequence_without_gaps_or_duplicates() {
        for page_size in 1..=7 {
            for count in 0..=30usize {
                let items: Vec<usize> = (0..count).collect();
                let expected_pages = count.div_ceil(page_size);
                let mut seen = Vec::new();

                for number in 1..=expected_pages {
                    let current = paginate(items.clone(), size(page_size), page(number));
                    assert_eq!(current.num_pages, expected_pages);
                    if number < expected_pages || count % page_size == 0 {
                        assert_eq!(current.len(), page_size);
                    } else {
                        assert_eq!(current.len(), count % page_size);
                    }
                    seen.extend(current.items);
                }

                assert_eq!(seen, items, "size {page_size}, count {count}");
            }
        }
    }

    #[test]
    fn empty_sequence_has_no_pages() {
        let first = paginate(Vec::<u8>::new(), size(5), PageNumber::FIRST);
        assert!(first.is_empty());
        assert_eq!(first.num_pages, 0);
        assert!(!first.has_previous);
        assert!(!first.has_next);
    }
}
