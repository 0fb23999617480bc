//! Windowed pagination over page-indexed backends.
//!
//! A virtual-scrolling caller asks for arbitrary `(offset, count)` windows; the
//! backend only answers `(page_number, page_size)` pages plus a separate count.
//! [`solve`] finds the smallest page that contains the window, [`fetch_page`]
//! issues it, and [`slice`] cuts the exact window back out.
//!
//! Backends that cannot report a total per page implement [`SlicedBackend`]
//! instead and are served by [`SlicedProvider`] through the same solver and
//! slicer.

pub mod adapter;
pub mod builder;
pub mod error;
pub mod filter;
pub mod memory;
pub mod page;
pub mod provider;
pub mod slicer;
pub mod solver;
pub mod sort;
pub mod window;

pub use adapter::{fetch_chunk, fetch_page, plan, PagedBackend, SlicedBackend};
pub use builder::{FnBackend, ProviderBuilder};
pub use error::{PagingError, PagingResult};
pub use filter::{FilterState, ListenerId, RefreshEvent, RefreshReason};
pub use memory::{InMemoryBackend, InMemoryError};
pub use page::{Chunk, Page, Pageable};
pub use provider::{SlicedProvider, WindowedProvider};
pub use slicer::{slice, slice_chunk, WindowSlice};
pub use solver::{solve, PageGeometry};
pub use sort::{translate, Sort, SortDir, SortOrder, SortSpec};
pub use window::Window;

#[cfg(test)]
mod tests;
