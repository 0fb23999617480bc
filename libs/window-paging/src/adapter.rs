//! Backend ports and the single-call fetches built on top of them.

use async_trait::async_trait;

use crate::error::{PagingError, PagingResult};
use crate::page::{Chunk, Page, Pageable};
use crate::solver::solve;
use crate::sort::{translate, SortSpec};
use crate::window::Window;

/// Port for the page-indexed backend the adapter serves windows from.
///
/// `page` must return content aligned to `page_number * page_size` and a
/// `total_elements` consistent with `count` for the same filter.
/// `Error` must absorb [`PagingError`] so caller misuse can be reported in the
/// backend's own error type; backend failures are never wrapped.
#[async_trait]
pub trait PagedBackend: Send + Sync {
    type Item: Send + 'static;
    type Filter: Send + Sync + 'static;
    type Error: From<PagingError> + Send + 'static;

    async fn page(
        &self,
        pageable: &Pageable,
        filter: &Self::Filter,
    ) -> Result<Page<Self::Item>, Self::Error>;

    async fn count(&self, filter: &Self::Filter) -> Result<u64, Self::Error>;
}

/// Port for backends that answer a page with its content and a `has_next`
/// flag but no total. The total is only known through `count`.
#[async_trait]
pub trait SlicedBackend: Send + Sync {
    type Item: Send + 'static;
    type Filter: Send + Sync + 'static;
    type Error: From<PagingError> + Send + 'static;

    async fn chunk(
        &self,
        pageable: &Pageable,
        filter: &Self::Filter,
    ) -> Result<Chunk<Self::Item>, Self::Error>;

    async fn count(&self, filter: &Self::Filter) -> Result<u64, Self::Error>;
}

#[async_trait]
impl<B> PagedBackend for std::sync::Arc<B>
where
    B: PagedBackend + ?Sized,
{
    type Item = B::Item;
    type Filter = B::Filter;
    type Error = B::Error;

    async fn page(
        &self,
        pageable: &Pageable,
        filter: &Self::Filter,
    ) -> Result<Page<Self::Item>, Self::Error> {
        (**self).page(pageable, filter).await
    }

    async fn count(&self, filter: &Self::Filter) -> Result<u64, Self::Error> {
        (**self).count(filter).await
    }
}

#[async_trait]
impl<B> SlicedBackend for std::sync::Arc<B>
where
    B: SlicedBackend + ?Sized,
{
    type Item = B::Item;
    type Filter = B::Filter;
    type Error = B::Error;

    async fn chunk(
        &self,
        pageable: &Pageable,
        filter: &Self::Filter,
    ) -> Result<Chunk<Self::Item>, Self::Error> {
        (**self).chunk(pageable, filter).await
    }

    async fn count(&self, filter: &Self::Filter) -> Result<u64, Self::Error> {
        (**self).count(filter).await
    }
}

/// Solve and translate into the one `Pageable` either port is asked for.
///
/// Fails with [`PagingError::PageOverflow`] when the solved page would end
/// past `u64::MAX`; no backend can address such a page.
pub fn plan(
    window: Window,
    sort_orders: &SortSpec,
    default_orders: &SortSpec,
) -> PagingResult<Pageable> {
    let geometry = solve(window);
    if geometry.checked_end().is_none() {
        return Err(PagingError::PageOverflow {
            page_number: geometry.page_number,
            page_size: geometry.page_size,
        });
    }

    let sort = translate(sort_orders, default_orders);
    let pageable = Pageable::new(geometry, window.offset(), sort);
    tracing::debug!(
        window = %window,
        page_number = pageable.page_number,
        page_size = pageable.page_size,
        sort = %pageable.sort,
        "requesting backend page"
    );
    Ok(pageable)
}

/// Solve the geometry for `window`, translate the sort and issue exactly one
/// backend page call.
///
/// Returns the page together with the `Pageable` it answered; the slicer needs
/// both. Backend errors are returned untouched and never retried.
pub async fn fetch_page<B>(
    backend: &B,
    window: Window,
    sort_orders: &SortSpec,
    default_orders: &SortSpec,
    filter: &B::Filter,
) -> Result<(Page<B::Item>, Pageable), B::Error>
where
    B: PagedBackend + ?Sized,
{
    let pageable = plan(window, sort_orders, default_orders)?;
    let page = backend.page(&pageable, filter).await?;
    Ok((page, pageable))
}

/// [`fetch_page`] for the sliced port: one `chunk` call, same geometry.
pub async fn fetch_chunk<B>(
    backend: &B,
    window: Window,
    sort_orders: &SortSpec,
    default_orders: &SortSpec,
    filter: &B::Filter,
) -> Result<(Chunk<B::Item>, Pageable), B::Error>
where
    B: SlicedBackend + ?Sized,
{
    let pageable = plan(window, sort_orders, default_orders)?;
    let chunk = backend.chunk(&pageable, filter).await?;
    Ok((chunk, pageable))
}
