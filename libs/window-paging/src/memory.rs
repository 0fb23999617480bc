//! Page-aligned backend over an owned `Vec<T>`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::adapter::{PagedBackend, SlicedBackend};
use crate::error::PagingError;
use crate::page::{Chunk, Page, Pageable};
use crate::sort::{SortDir, SortOrder};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InMemoryError {
    #[error(transparent)]
    Paging(#[from] PagingError),

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),
}

type Predicate<T, F> = Arc<dyn Fn(&T, &F) -> bool + Send + Sync>;
type FieldComparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// Serves pages of `rows` that match the filter predicate, ordered by the
/// registered sortable fields. Unsorted requests keep insertion order.
pub struct InMemoryBackend<T, F> {
    rows: Vec<T>,
    predicate: Predicate<T, F>,
    fields: HashMap<String, FieldComparator<T>>,
    page_calls: AtomicU64,
    count_calls: AtomicU64,
}

impl<T, F> InMemoryBackend<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    pub fn new(rows: Vec<T>, predicate: impl Fn(&T, &F) -> bool + Send + Sync + 'static) -> Self {
        Self {
            rows,
            predicate: Arc::new(predicate),
            fields: HashMap::new(),
            page_calls: AtomicU64::new(0),
            count_calls: AtomicU64::new(0),
        }
    }

    /// Register a sortable field. Names are matched case-insensitively.
    pub fn sortable(
        mut self,
        name: impl Into<String>,
        cmp: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    ) -> Self {
        self.fields.insert(name.into().to_lowercase(), Arc::new(cmp));
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of `page` and `chunk` calls served so far.
    pub fn page_calls(&self) -> u64 {
        self.page_calls.load(AtomicOrdering::Relaxed)
    }

    /// Number of `count` calls served so far.
    pub fn count_calls(&self) -> u64 {
        self.count_calls.load(AtomicOrdering::Relaxed)
    }

    fn matching(&self, filter: &F) -> Vec<&T> {
        self.rows
            .iter()
            .filter(|row| (self.predicate)(*row, filter))
            .collect()
    }

    fn comparators(
        &self,
        orders: &[SortOrder],
    ) -> Result<Vec<(FieldComparator<T>, SortDir)>, InMemoryError> {
        orders
            .iter()
            .map(|o| {
                self.fields
                    .get(&o.field.to_lowercase())
                    .map(|cmp| (cmp.clone(), o.dir))
                    .ok_or_else(|| InMemoryError::UnknownSortField(o.field.clone()))
            })
            .collect()
    }
}

impl<T, F> InMemoryBackend<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    /// Rows of the requested page, clipped to the data, plus the filtered total.
    fn serve(&self, pageable: &Pageable, filter: &F) -> Result<(Vec<T>, u64), InMemoryError> {
        self.page_calls.fetch_add(1, AtomicOrdering::Relaxed);

        let keys = self.comparators(pageable.sort.orders())?;
        let mut rows = self.matching(filter);
        if !keys.is_empty() {
            rows.sort_by(|a, b| {
                keys.iter()
                    .map(|(cmp, dir)| match dir {
                        SortDir::Asc => cmp(*a, *b),
                        SortDir::Desc => cmp(*a, *b).reverse(),
                    })
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let total = rows.len() as u64;
        let start = usize::try_from(pageable.page_start().min(total)).unwrap_or(rows.len());
        let end = usize::try_from(pageable.page_end().min(total)).unwrap_or(rows.len());
        let content = rows[start..end].iter().map(|row| (*row).clone()).collect();
        Ok((content, total))
    }

    fn count_matching(&self, filter: &F) -> u64 {
        self.count_calls.fetch_add(1, AtomicOrdering::Relaxed);
        self.matching(filter).len() as u64
    }
}

#[async_trait]
impl<T, F> PagedBackend for InMemoryBackend<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    type Item = T;
    type Filter = F;
    type Error = InMemoryError;

    async fn page(&self, pageable: &Pageable, filter: &F) -> Result<Page<T>, InMemoryError> {
        let (content, total) = self.serve(pageable, filter)?;
        Ok(Page::new(content, pageable, total))
    }

    async fn count(&self, filter: &F) -> Result<u64, InMemoryError> {
        Ok(self.count_matching(filter))
    }
}

#[async_trait]
impl<T, F> SlicedBackend for InMemoryBackend<T, F>
where
    T: Clone + Send + Sync + 'static,
    F: Send + Sync + 'static,
{
    type Item = T;
    type Filter = F;
    type Error = InMemoryError;

    /// Same rows as `page`; `has_next` is set when data continues past the page.
    async fn chunk(&self, pageable: &Pageable, filter: &F) -> Result<Chunk<T>, InMemoryError> {
        let (content, total) = self.serve(pageable, filter)?;
        Ok(Chunk::new(content, pageable, pageable.page_end() < total))
    }

    async fn count(&self, filter: &F) -> Result<u64, InMemoryError> {
        Ok(self.count_matching(filter))
    }
}

impl<T, F> std::fmt::Debug for InMemoryBackend<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut fields: Vec<_> = self.fields.keys().collect();
        fields.sort();
        f.debug_struct("InMemoryBackend")
            .field("rows", &self.rows.len())
            .field("sortable", &fields)
            .finish()
    }
}
