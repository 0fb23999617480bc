//! Declarative provider assembly from a pair of query functions.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};

use crate::adapter::{PagedBackend, SlicedBackend};
use crate::error::PagingError;
use crate::page::{Chunk, Page, Pageable};
use crate::provider::{SlicedProvider, WindowedProvider};
use crate::sort::SortSpec;

type QueryFn<R, F, E> =
    Arc<dyn Fn(Pageable, F) -> BoxFuture<'static, Result<R, E>> + Send + Sync>;
type CountFn<F, E> = Arc<dyn Fn(F) -> BoxFuture<'static, Result<u64, E>> + Send + Sync>;

/// Backend made of two async functions: one page query and one count query.
///
/// `R` is what the query answers: a [`Page`] makes it a [`PagedBackend`], a
/// [`Chunk`] a [`SlicedBackend`].
pub struct FnBackend<R, F, E> {
    query: QueryFn<R, F, E>,
    count: CountFn<F, E>,
}

impl<R, F, E> FnBackend<R, F, E>
where
    R: Send + 'static,
    F: Send + 'static,
    E: Send + 'static,
{
    pub fn new<Q, QFut, C, CFut>(query: Q, count: C) -> Self
    where
        Q: Fn(Pageable, F) -> QFut + Send + Sync + 'static,
        QFut: Future<Output = Result<R, E>> + Send + 'static,
        C: Fn(F) -> CFut + Send + Sync + 'static,
        CFut: Future<Output = Result<u64, E>> + Send + 'static,
    {
        Self {
            query: Arc::new(move |pageable: Pageable, filter: F| {
                query(pageable, filter).boxed()
            }),
            count: Arc::new(move |filter: F| count(filter).boxed()),
        }
    }
}

impl<R, F, E> Clone for FnBackend<R, F, E> {
    fn clone(&self) -> Self {
        Self {
            query: self.query.clone(),
            count: self.count.clone(),
        }
    }
}

#[async_trait]
impl<T, F, E> PagedBackend for FnBackend<Page<T>, F, E>
where
    T: Send + 'static,
    F: Clone + Send + Sync + 'static,
    E: From<PagingError> + Send + 'static,
{
    type Item = T;
    type Filter = F;
    type Error = E;

    async fn page(&self, pageable: &Pageable, filter: &F) -> Result<Page<T>, E> {
        (self.query)(pageable.clone(), filter.clone()).await
    }

    async fn count(&self, filter: &F) -> Result<u64, E> {
        (self.count)(filter.clone()).await
    }
}

#[async_trait]
impl<T, F, E> SlicedBackend for FnBackend<Chunk<T>, F, E>
where
    T: Send + 'static,
    F: Clone + Send + Sync + 'static,
    E: From<PagingError> + Send + 'static,
{
    type Item = T;
    type Filter = F;
    type Error = E;

    async fn chunk(&self, pageable: &Pageable, filter: &F) -> Result<Chunk<T>, E> {
        (self.query)(pageable.clone(), filter.clone()).await
    }

    async fn count(&self, filter: &F) -> Result<u64, E> {
        (self.count)(filter.clone()).await
    }
}

/// Wires a backend, a default sort and an optional default filter into a
/// [`WindowedProvider`] or, for a [`SlicedBackend`], a [`SlicedProvider`].
/// Does nothing beyond wiring.
pub struct ProviderBuilder<B, F> {
    backend: B,
    default_sort: SortSpec,
    default_filter: Option<F>,
}

impl<T, F, E> ProviderBuilder<FnBackend<Page<T>, F, E>, F>
where
    T: Send + 'static,
    F: Clone + Send + Sync + 'static,
    E: From<PagingError> + Send + 'static,
{
    /// Start from a page-query function and a count function.
    ///
    /// ```ignore
    /// let provider = ProviderBuilder::from_fns(
    ///     |pageable, filter| async move { repo.page(pageable, filter).await },
    ///     |filter| async move { repo.count(filter).await },
    /// )
    /// .default_sort(SortSpec::from_signed_tokens("+name")?)
    /// .build();
    /// ```
    pub fn from_fns<P, PFut, C, CFut>(page: P, count: C) -> Self
    where
        P: Fn(Pageable, F) -> PFut + Send + Sync + 'static,
        PFut: Future<Output = Result<Page<T>, E>> + Send + 'static,
        C: Fn(F) -> CFut + Send + Sync + 'static,
        CFut: Future<Output = Result<u64, E>> + Send + 'static,
    {
        Self::new(FnBackend::new(page, count))
    }
}

impl<T, F, E> ProviderBuilder<FnBackend<Chunk<T>, F, E>, F>
where
    T: Send + 'static,
    F: Clone + Send + Sync + 'static,
    E: From<PagingError> + Send + 'static,
{
    /// Start from a chunk-query function (content plus `has_next`) and a
    /// count function; finish with [`ProviderBuilder::build_sliced`].
    pub fn from_chunk_fns<Q, QFut, C, CFut>(chunk: Q, count: C) -> Self
    where
        Q: Fn(Pageable, F) -> QFut + Send + Sync + 'static,
        QFut: Future<Output = Result<Chunk<T>, E>> + Send + 'static,
        C: Fn(F) -> CFut + Send + Sync + 'static,
        CFut: Future<Output = Result<u64, E>> + Send + 'static,
    {
        Self::sliced(FnBackend::new(chunk, count))
    }
}

impl<B, F> ProviderBuilder<B, F> {
    /// Order used whenever a caller passes no sort keys.
    pub fn default_sort(mut self, sort: SortSpec) -> Self {
        self.default_sort = sort;
        self
    }

    /// Filter used until the caller sets one explicitly.
    pub fn default_filter(mut self, filter: F) -> Self {
        self.default_filter = Some(filter);
        self
    }
}

impl<B: PagedBackend> ProviderBuilder<B, B::Filter> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            default_sort: SortSpec::empty(),
            default_filter: None,
        }
    }

    pub fn build(self) -> WindowedProvider<B> {
        WindowedProvider::new(self.backend, self.default_sort, self.default_filter)
    }
}

impl<B: SlicedBackend> ProviderBuilder<B, B::Filter> {
    pub fn sliced(backend: B) -> Self {
        Self {
            backend,
            default_sort: SortSpec::empty(),
            default_filter: None,
        }
    }

    pub fn build_sliced(self) -> SlicedProvider<B> {
        SlicedProvider::new(self.backend, self.default_sort, self.default_filter)
    }
}
