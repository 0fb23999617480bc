//! The caller-facing providers: `size` and `fetch` over either backend port.

use tracing::{debug, instrument};

use crate::adapter::{fetch_chunk, fetch_page, PagedBackend, SlicedBackend};
use crate::filter::{FilterState, ListenerId, RefreshEvent};
use crate::slicer::{slice, slice_chunk, WindowSlice};
use crate::sort::SortSpec;
use crate::window::Window;

/// Serves arbitrary `(offset, count)` windows from a backend that only knows
/// `(page_number, page_size)` pages.
///
/// Nothing is cached between calls: every `fetch` is one backend page call and
/// every `size` is one backend count call.
pub struct WindowedProvider<B: PagedBackend> {
    backend: B,
    default_sort: SortSpec,
    filter: FilterState<B::Filter>,
}

impl<B: PagedBackend> WindowedProvider<B> {
    pub fn new(backend: B, default_sort: SortSpec, default_filter: Option<B::Filter>) -> Self {
        Self {
            backend,
            default_sort,
            filter: FilterState::new(default_filter),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn default_sort(&self) -> &SortSpec {
        &self.default_sort
    }

    /// The active filter, if any.
    pub fn filter(&self) -> Option<&B::Filter> {
        self.filter.current()
    }

    pub fn filter_generation(&self) -> u64 {
        self.filter.generation()
    }

    /// Replace the active filter. Callers must drop any cached size or rows
    /// and re-issue `size` and `fetch`.
    pub fn set_filter(&mut self, filter: B::Filter) -> RefreshEvent {
        self.filter.set(filter)
    }

    /// Invalidate callers without touching the filter (backend data changed).
    pub fn refresh_all(&mut self) -> RefreshEvent {
        self.filter.refresh_all()
    }

    pub fn on_refresh(
        &mut self,
        listener: impl Fn(&RefreshEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.filter.on_refresh(listener)
    }

    pub fn remove_refresh_listener(&mut self, id: ListenerId) -> bool {
        self.filter.remove_listener(id)
    }

    /// Total records matching `filter`, or the active filter when `None`.
    #[instrument(name = "window_paging.provider.size", skip_all, level = "debug")]
    pub async fn size(&self, filter: Option<&B::Filter>) -> Result<u64, B::Error> {
        let filter = self.filter.resolve(filter)?;
        let total = self.backend.count(filter).await?;
        debug!(total, "counted records");
        Ok(total)
    }

    /// Records `[offset, offset + count)` in the requested order; fewer only
    /// when the result set ends inside the window.
    #[instrument(
        name = "window_paging.provider.fetch",
        skip(self, sort_orders, filter),
        fields(sort = %sort_orders),
        level = "debug"
    )]
    pub async fn fetch(
        &self,
        offset: u64,
        count: u64,
        sort_orders: &SortSpec,
        filter: Option<&B::Filter>,
    ) -> Result<WindowSlice<B::Item>, B::Error> {
        let window = Window::new(offset, count)?;
        let filter = self.filter.resolve(filter)?;

        let (page, pageable) =
            fetch_page(&self.backend, window, sort_orders, &self.default_sort, filter).await?;
        let records = slice(page, &pageable, window)?;

        debug!(
            page_number = pageable.page_number,
            page_size = pageable.page_size,
            returned = records.len(),
            total = ?records.total_elements(),
            "window fetched"
        );
        Ok(records)
    }
}

impl<B> std::fmt::Debug for WindowedProvider<B>
where
    B: PagedBackend + std::fmt::Debug,
    B::Filter: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowedProvider")
            .field("backend", &self.backend)
            .field("default_sort", &self.default_sort)
            .field("filter", &self.filter)
            .finish()
    }
}

/// [`WindowedProvider`] over a [`SlicedBackend`].
///
/// Windows come from `chunk` calls that carry no total; `size` asks the
/// separate count function. [`WindowSlice::has_more`] lets a scrolling caller
/// stop without ever calling `size`.
pub struct SlicedProvider<B: SlicedBackend> {
    backend: B,
    default_sort: SortSpec,
    filter: FilterState<B::Filter>,
}

impl<B: SlicedBackend> SlicedProvider<B> {
    pub fn new(backend: B, default_sort: SortSpec, default_filter: Option<B::Filter>) -> Self {
        Self {
            backend,
            default_sort,
            filter: FilterState::new(default_filter),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn default_sort(&self) -> &SortSpec {
        &self.default_sort
    }

    pub fn filter(&self) -> Option<&B::Filter> {
        self.filter.current()
    }

    pub fn filter_generation(&self) -> u64 {
        self.filter.generation()
    }

    pub fn set_filter(&mut self, filter: B::Filter) -> RefreshEvent {
        self.filter.set(filter)
    }

    pub fn refresh_all(&mut self) -> RefreshEvent {
        self.filter.refresh_all()
    }

    pub fn on_refresh(
        &mut self,
        listener: impl Fn(&RefreshEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        self.filter.on_refresh(listener)
    }

    pub fn remove_refresh_listener(&mut self, id: ListenerId) -> bool {
        self.filter.remove_listener(id)
    }

    #[instrument(name = "window_paging.sliced_provider.size", skip_all, level = "debug")]
    pub async fn size(&self, filter: Option<&B::Filter>) -> Result<u64, B::Error> {
        let filter = self.filter.resolve(filter)?;
        let total = self.backend.count(filter).await?;
        debug!(total, "counted records");
        Ok(total)
    }

    #[instrument(
        name = "window_paging.sliced_provider.fetch",
        skip(self, sort_orders, filter),
        fields(sort = %sort_orders),
        level = "debug"
    )]
    pub async fn fetch(
        &self,
        offset: u64,
        count: u64,
        sort_orders: &SortSpec,
        filter: Option<&B::Filter>,
    ) -> Result<WindowSlice<B::Item>, B::Error> {
        let window = Window::new(offset, count)?;
        let filter = self.filter.resolve(filter)?;

        let (chunk, pageable) =
            fetch_chunk(&self.backend, window, sort_orders, &self.default_sort, filter).await?;
        let records = slice_chunk(chunk, &pageable, window)?;

        debug!(
            page_number = pageable.page_number,
            page_size = pageable.page_size,
            returned = records.len(),
            has_more = records.has_more(),
            "window fetched"
        );
        Ok(records)
    }
}

impl<B> std::fmt::Debug for SlicedProvider<B>
where
    B: SlicedBackend + std::fmt::Debug,
    B::Filter: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlicedProvider")
            .field("backend", &self.backend)
            .field("default_sort", &self.default_sort)
            .field("filter", &self.filter)
            .finish()
    }
}
