//! Cuts the caller's exact window out of a backend page.

use std::iter::{Skip, Take};
use std::vec::IntoIter;

use crate::error::{PagingError, PagingResult};
use crate::page::{Chunk, Page, Pageable};
use crate::window::Window;

type Records<T> = Take<Skip<IntoIter<T>>>;

/// Lazy, exact-sized run of records cut from one page.
///
/// Carries the request it was cut from so callers can log or cache against it.
#[derive(Debug)]
pub struct WindowSlice<T> {
    records: Records<T>,
    window: Window,
    pageable: Pageable,
    total_elements: Option<u64>,
    has_more: bool,
}

impl<T> WindowSlice<T> {
    pub fn window(&self) -> Window {
        self.window
    }

    pub fn pageable(&self) -> &Pageable {
        &self.pageable
    }

    /// Total matching records as reported with the page; `None` for chunks.
    pub fn total_elements(&self) -> Option<u64> {
        self.total_elements
    }

    /// Whether records exist past the end of this window.
    pub fn has_more(&self) -> bool {
        self.has_more
    }
}

impl<T> Iterator for WindowSlice<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl<T> ExactSizeIterator for WindowSlice<T> {}

/// Extract `[window.offset, window.offset + window.count)` from `page`.
///
/// The page content is taken to start at `pageable.page_number * pageable.page_size`,
/// so the local start is `window.offset - page_start`. The result holds
/// `min(count, max(0, content.len() - local_start))` records.
///
/// The window must lie inside the page: a shorter result then always means
/// the data ended, never that the page was too small.
pub fn slice<T>(
    page: Page<T>,
    pageable: &Pageable,
    window: Window,
) -> PagingResult<WindowSlice<T>> {
    let (records, _) = cut(page.content, pageable, window)?;
    Ok(WindowSlice {
        records,
        window,
        pageable: pageable.clone(),
        total_elements: Some(page.total_elements),
        has_more: page.total_elements > window.end(),
    })
}

/// [`slice`] for a [`Chunk`]: no total, `has_more` comes from the content past
/// the window or the backend's `has_next`.
pub fn slice_chunk<T>(
    chunk: Chunk<T>,
    pageable: &Pageable,
    window: Window,
) -> PagingResult<WindowSlice<T>> {
    let (records, beyond_window) = cut(chunk.content, pageable, window)?;
    Ok(WindowSlice {
        records,
        window,
        pageable: pageable.clone(),
        total_elements: None,
        has_more: beyond_window || chunk.has_next,
    })
}

fn cut<T>(
    content: Vec<T>,
    pageable: &Pageable,
    window: Window,
) -> PagingResult<(Records<T>, bool)> {
    let page_start = pageable.page_start();
    let local_start = window
        .offset()
        .checked_sub(page_start)
        .ok_or(PagingError::WindowOutsidePage {
            offset: window.offset(),
            page_start,
        })?;

    let page_end = pageable.page_end();
    if window.end() > page_end {
        return Err(PagingError::WindowPastPageEnd {
            end: window.end(),
            page_end,
        });
    }

    let content_len = content.len();
    if content_len as u64 > pageable.page_size {
        tracing::warn!(
            content_len,
            page_size = pageable.page_size,
            "backend returned more records than the page size"
        );
    }

    let skip = usize::try_from(local_start).unwrap_or(usize::MAX);
    let take = usize::try_from(window.count()).unwrap_or(usize::MAX);
    tracing::trace!(
        window = %window,
        page_start,
        local_start,
        content_len,
        "slicing window from page"
    );

    let beyond_window = content_len as u64 > local_start + window.count();
    Ok((content.into_iter().skip(skip).take(take), beyond_window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;
    use crate::sort::Sort;
    use tracing_test::traced_test;

    /// Aligned backend over `0..n`.
    fn page_for(pageable: &Pageable, n: u64) -> Page<u64> {
        let start = pageable.page_start().min(n);
        let end = pageable.page_end().min(n);
        Page::new((start..end).collect(), pageable, n)
    }

    fn cut(offset: u64, count: u64, n: u64) -> Vec<u64> {
        let window = Window::new(offset, count).unwrap();
        let pageable = Pageable::new(solve(window), offset, Sort::Unsorted);
        let page = page_for(&pageable, n);
        slice(page, &pageable, window).unwrap().collect()
    }

    #[test]
    fn recovers_unaligned_window_from_larger_page() {
        // (50, 45) solves to page 1 of size 48, i.e. [48, 96).
        assert_eq!(cut(50, 45, 95), (50..95).collect::<Vec<_>>());
        assert_eq!(cut(7, 3, 100), vec![7, 8, 9]);
    }

    #[test]
    fn clips_at_end_of_data() {
        assert_eq!(cut(90, 10, 95), (90..95).collect::<Vec<_>>());
        assert!(cut(200, 10, 95).is_empty());
    }

    #[test]
    fn local_start_uses_page_start_not_requested_offset() {
        let window = Window::new(7, 3).unwrap();
        let pageable = Pageable::new(solve(window), 7, Sort::Unsorted);
        assert_eq!(pageable.page_start(), 5);
        let page = page_for(&pageable, 100);
        assert_eq!(page.content, vec![5, 6, 7, 8, 9]);

        let got: Vec<_> = slice(page, &pageable, window).unwrap().collect();
        assert_eq!(got, vec![7, 8, 9]);
    }

    #[test]
    fn window_before_page_is_rejected() {
        let pageable = Pageable::of(2, 10, Sort::Unsorted).unwrap();
        let page = page_for(&pageable, 100);
        let err = slice(page, &pageable, Window::new(5, 3).unwrap()).unwrap_err();
        assert_eq!(
            err,
            PagingError::WindowOutsidePage {
                offset: 5,
                page_start: 20
            }
        );
    }

    #[test]
    fn slice_is_exact_sized_and_keeps_context() {
        let window = Window::new(10, 4).unwrap();
        let pageable = Pageable::new(solve(window), 10, Sort::Unsorted);
        let s = slice(page_for(&pageable, 12), &pageable, window).unwrap();
        assert_eq!(s.len(), 2);
        assert_eq!(s.total_elements(), Some(12));
        assert!(!s.has_more());
        assert_eq!(s.window(), window);
        assert_eq!(s.pageable().page_size, 5);
    }

    #[test]
    fn window_past_page_end_is_rejected() {
        // [10, 20) cannot serve [15, 25); a silent short read would look like end of data.
        let pageable = Pageable::of(1, 10, Sort::Unsorted).unwrap();
        let page = page_for(&pageable, 100);
        let err = slice(page, &pageable, Window::new(15, 10).unwrap()).unwrap_err();
        assert_eq!(
            err,
            PagingError::WindowPastPageEnd {
                end: 25,
                page_end: 20
            }
        );
    }

    #[traced_test]
    #[test]
    fn oversized_page_is_sliced_with_a_warning() {
        let pageable = Pageable::of(0, 4, Sort::Unsorted).unwrap();
        let page = Page::new((0..6).collect::<Vec<u64>>(), &pageable, 6);
        let got: Vec<_> = slice(page, &pageable, Window::new(1, 3).unwrap())
            .unwrap()
            .collect();
        assert_eq!(got, vec![1, 2, 3]);
        assert!(logs_contain("backend returned more records than the page size"));
    }

    #[test]
    fn has_more_follows_total() {
        let window = Window::new(0, 50).unwrap();
        let pageable = Pageable::new(solve(window), 0, Sort::Unsorted);
        assert!(slice(page_for(&pageable, 95), &pageable, window).unwrap().has_more());
        assert!(!slice(page_for(&pageable, 50), &pageable, window).unwrap().has_more());
    }

    #[test]
    fn chunk_slices_without_a_total() {
        // (50, 45) -> [48, 96): rows 48..95 present, backend says nothing follows.
        let window = Window::new(50, 45).unwrap();
        let pageable = Pageable::new(solve(window), 50, Sort::Unsorted);
        let chunk = Chunk::new((48..95).collect::<Vec<u64>>(), &pageable, false);
        let s = slice_chunk(chunk, &pageable, window).unwrap();
        assert_eq!(s.total_elements(), None);
        assert!(!s.has_more());
        assert_eq!(s.collect::<Vec<_>>(), (50..95).collect::<Vec<_>>());

        // Rows past the window inside the same page mean more data even without has_next.
        let window = Window::new(48, 10).unwrap();
        let pageable = Pageable::of(4, 12, Sort::Unsorted).unwrap();
        let chunk = Chunk::new((48..60).collect::<Vec<u64>>(), &pageable, false);
        let s = slice_chunk(chunk, &pageable, window).unwrap();
        assert!(s.has_more());
        assert_eq!(s.len(), 10);

        let pageable = Pageable::of(1, 10, Sort::Unsorted).unwrap();
        let chunk = Chunk::new((10..20).collect::<Vec<u64>>(), &pageable, true);
        let s = slice_chunk(chunk, &pageable, Window::new(10, 10).unwrap()).unwrap();
        assert!(s.has_more());
    }
}
