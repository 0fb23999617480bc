use serde::{Deserialize, Serialize};

use crate::error::{PagingError, PagingResult};
use crate::solver::PageGeometry;
use crate::sort::Sort;

/// Request sent to the backend: which page, how large, in what order.
///
/// `requested_offset` is the caller's original window offset and is kept for
/// diagnostics only; the page itself starts at `page_number * page_size`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pageable {
    pub page_number: u64,
    pub page_size: u64,
    pub requested_offset: u64,
    pub sort: Sort,
}

impl Pageable {
    pub fn new(geometry: PageGeometry, requested_offset: u64, sort: Sort) -> Self {
        Self {
            page_number: geometry.page_number,
            page_size: geometry.page_size,
            requested_offset,
            sort,
        }
    }

    /// Plain page request with no window behind it.
    pub fn of(page_number: u64, page_size: u64, sort: Sort) -> PagingResult<Self> {
        if page_size == 0 {
            return Err(PagingError::ZeroPageSize);
        }
        Ok(Self {
            page_number,
            page_size,
            requested_offset: page_number.saturating_mul(page_size),
            sort,
        })
    }

    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            page_size: self.page_size,
            page_number: self.page_number,
        }
    }

    /// First logical index covered by this page, saturating at `u64::MAX`.
    #[inline]
    pub fn page_start(&self) -> u64 {
        self.geometry().page_start()
    }

    /// Exclusive end of the logical range covered by this page.
    #[inline]
    pub fn page_end(&self) -> u64 {
        self.geometry().page_end()
    }

    /// Stable key over page number, size and sort for callers layering their
    /// own cache; the filter part of the key is theirs to add.
    pub fn cache_key(&self) -> String {
        format!(
            "p{}:s{}:{}",
            self.page_number,
            self.page_size,
            match &self.sort {
                Sort::Unsorted => String::new(),
                Sort::By(orders) => crate::SortSpec(orders.clone()).to_signed_tokens(),
            }
        )
    }
}

/// One backend page: its content plus the geometry it was computed against
/// and the total number of matching records.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    /// Create a page answering `pageable`.
    pub fn new(content: Vec<T>, pageable: &Pageable, total_elements: u64) -> Self {
        Self {
            content,
            page_number: pageable.page_number,
            page_size: pageable.page_size,
            total_elements,
        }
    }

    /// Create an empty page for `pageable` with the given total.
    pub fn empty(pageable: &Pageable, total_elements: u64) -> Self {
        Self::new(Vec::new(), pageable, total_elements)
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page_number + 1 < self.total_pages()
    }

    pub fn is_last(&self) -> bool {
        !self.has_next()
    }

    /// Map content while preserving page coordinates.
    pub fn map_content<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            total_elements: self.total_elements,
        }
    }
}

/// One page from a backend that cannot count cheaply: content plus whether
/// anything follows it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk<T> {
    pub content: Vec<T>,
    pub page_number: u64,
    pub page_size: u64,
    pub has_next: bool,
}

impl<T> Chunk<T> {
    pub fn new(content: Vec<T>, pageable: &Pageable, has_next: bool) -> Self {
        Self {
            content,
            page_number: pageable.page_number,
            page_size: pageable.page_size,
            has_next,
        }
    }

    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    pub fn map_content<U>(self, f: impl FnMut(T) -> U) -> Chunk<U> {
        Chunk {
            content: self.content.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_size: self.page_size,
            has_next: self.has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortOrder;

    #[test]
    fn page_counts() {
        let pageable = Pageable::of(1, 45, Sort::Unsorted).unwrap();
        let page = Page::new((45..90).collect::<Vec<u32>>(), &pageable, 95);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());
        assert_eq!(page.number_of_elements(), 45);

        let tail = Pageable::of(2, 45, Sort::Unsorted).unwrap();
        let last = Page::new(vec![90u32, 91, 92, 93, 94], &tail, 95);
        assert!(last.is_last());
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(
            Pageable::of(0, 0, Sort::Unsorted),
            Err(PagingError::ZeroPageSize)
        );
    }

    #[test]
    fn map_content_keeps_coordinates() {
        let pageable = Pageable::of(2, 3, Sort::Unsorted).unwrap();
        let page = Page::new(vec![6, 7, 8], &pageable, 20).map_content(|n| n.to_string());
        assert_eq!(page.content, vec!["6", "7", "8"]);
        assert_eq!(page.page_number, 2);
        assert_eq!(page.page_size, 3);
        assert_eq!(page.total_elements, 20);
    }

    #[test]
    fn cache_key_covers_geometry_and_sort() {
        let a = Pageable::of(1, 48, Sort::By(vec![SortOrder::desc("name")])).unwrap();
        let b = Pageable::of(1, 48, Sort::Unsorted).unwrap();
        assert_eq!(a.cache_key(), "p1:s48:-name");
        assert_eq!(b.cache_key(), "p1:s48:");
        assert_eq!(a.page_start(), 48);
        assert_eq!(a.page_end(), 96);
    }

    #[test]
    fn extreme_page_numbers_saturate() {
        let pageable = Pageable::of(u64::MAX, 2, Sort::Unsorted).unwrap();
        assert_eq!(pageable.requested_offset, u64::MAX);
        assert_eq!(pageable.page_start(), u64::MAX);
        assert_eq!(pageable.page_end(), u64::MAX);
    }

    #[test]
    fn chunk_keeps_coordinates_and_flag() {
        let pageable = Pageable::of(3, 4, Sort::Unsorted).unwrap();
        let chunk = Chunk::new(vec![12, 13, 14, 15], &pageable, true).map_content(|n| n * 2);
        assert_eq!(chunk.content, vec![24, 26, 28, 30]);
        assert_eq!(chunk.number_of_elements(), 4);
        assert_eq!((chunk.page_number, chunk.page_size), (3, 4));
        assert!(chunk.has_next);
    }
}
