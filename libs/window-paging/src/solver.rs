//! Page geometry search: the smallest backend page that fully contains a window.

use serde::{Deserialize, Serialize};

use crate::window::Window;

/// Backend page coordinates: the page covers
/// `[page_number * page_size, (page_number + 1) * page_size)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_size: u64,
    pub page_number: u64,
}

impl PageGeometry {
    /// Saturates at `u64::MAX` for coordinates past the index space.
    #[inline]
    pub fn page_start(&self) -> u64 {
        self.page_number.saturating_mul(self.page_size)
    }

    /// Exclusive end of the page, saturating like [`Self::page_start`].
    #[inline]
    pub fn page_end(&self) -> u64 {
        self.page_start().saturating_add(self.page_size)
    }

    /// Exclusive end of the page, or `None` when it does not fit in `u64`.
    pub fn checked_end(&self) -> Option<u64> {
        self.page_number
            .checked_add(1)
            .and_then(|n| n.checked_mul(self.page_size))
    }

    /// True when the whole window lies inside this page.
    pub fn contains(&self, window: &Window) -> bool {
        self.page_start() <= window.offset() && window.end() <= self.page_end()
    }
}

/// Find the smallest `page_size >= count` whose page holds the window without
/// crossing a page boundary.
///
/// Candidates are scanned upward from `count`, so the backend over-fetches as
/// little as possible. A page of size `last_index + 1` starting at zero always
/// fits and closes the search. For windows at the very top of the index space
/// the chosen page may end past `u64::MAX`; see [`PageGeometry::checked_end`].
/// The scan is linear; for a large offset with a small count it may evaluate
/// `O(offset)` candidates.
pub fn solve(window: Window) -> PageGeometry {
    let last_index = window.last_index();
    let max_page_size = last_index + 1;

    let found = (window.count()..max_page_size).find_map(|page_size| {
        let start_page = window.offset() / page_size;
        let end_page = last_index / page_size;
        (start_page == end_page).then_some(PageGeometry {
            page_size,
            page_number: start_page,
        })
    });

    let geometry = found.unwrap_or(PageGeometry {
        page_size: max_page_size,
        page_number: 0,
    });

    tracing::trace!(
        window = %window,
        page_size = geometry.page_size,
        page_number = geometry.page_number,
        "solved page geometry"
    );
    geometry
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(offset: u64, count: u64) -> PageGeometry {
        solve(Window::new(offset, count).unwrap())
    }

    #[test]
    fn first_chunk_is_its_own_page() {
        assert_eq!(
            geometry(0, 50),
            PageGeometry {
                page_size: 50,
                page_number: 0
            }
        );
    }

    #[test]
    fn tail_chunk_of_95_records_grows_past_count() {
        // 45 and 46 and 47 all split [50, 95) across two pages; 48 is the first fit.
        let g = geometry(50, 45);
        assert_eq!(g.page_size, 48);
        assert_eq!(g.page_number, 1);
        assert!(g.contains(&Window::new(50, 45).unwrap()));
    }

    #[test]
    fn small_unaligned_window_picks_smallest_fit() {
        let g = geometry(7, 3);
        let expected = (3u64..)
            .find(|p| 7 / p == 9 / p)
            .expect("a fitting page size exists");
        assert_eq!(g.page_size, expected);
        assert_eq!(g.page_size, 5);
        assert_eq!(g.page_number, 1);
    }

    #[test]
    fn fallback_spans_from_zero() {
        // Window [1, 3): p=2 splits it (0 vs 1); the fallback page [0, 3) is used.
        let g = geometry(1, 2);
        assert_eq!(
            g,
            PageGeometry {
                page_size: 3,
                page_number: 0
            }
        );
    }

    #[test]
    fn aligned_windows_keep_count_as_page_size() {
        for page in 0..20 {
            let g = geometry(page * 25, 25);
            assert_eq!(g.page_size, 25);
            assert_eq!(g.page_number, page);
        }
    }

    #[test]
    fn single_record_window() {
        assert_eq!(
            geometry(1234, 1),
            PageGeometry {
                page_size: 1,
                page_number: 1234
            }
        );
    }

    #[test]
    fn pages_near_the_top_of_the_index_space_never_panic() {
        // [MAX-6, MAX) first fits at size 8, whose page ends at 2^64.
        let window = Window::new(u64::MAX - 6, 6).unwrap();
        let g = solve(window);
        assert_eq!(
            g,
            PageGeometry {
                page_size: 8,
                page_number: (1 << 61) - 1
            }
        );
        assert_eq!(g.checked_end(), None);
        assert_eq!(g.page_end(), u64::MAX);

        for back in 1..200u64 {
            let window = Window::new(u64::MAX - back, 1).unwrap();
            let g = solve(window);
            assert!(g.contains(&window));
            assert!(g.checked_end().is_some());
        }
    }

    #[test]
    fn bounds_saturate_for_foreign_geometry() {
        let g = PageGeometry {
            page_size: 10,
            page_number: u64::MAX / 4,
        };
        assert_eq!(g.page_start(), u64::MAX);
        assert_eq!(g.page_end(), u64::MAX);
        assert_eq!(g.checked_end(), None);
    }
}
