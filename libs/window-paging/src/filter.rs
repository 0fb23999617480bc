//! The provider's single active filter and the refresh signal it emits.

use std::fmt;

use serde::Serialize;

use crate::error::{PagingError, PagingResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefreshReason {
    FilterReplaced,
    DataChanged,
}

/// "Discard everything and re-fetch": any size or position cached by the
/// caller is stale once this is emitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RefreshEvent {
    /// Monotonic counter, bumped on every event.
    pub generation: u64,
    pub reason: RefreshReason,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type RefreshListener = Box<dyn Fn(&RefreshEvent) + Send + Sync>;

/// Holds exactly one filter per provider.
///
/// Replacement is unconditional: setting an equal value still emits a refresh.
/// Mutation needs `&mut self`, so concurrent callers must serialize through
/// whatever owns the provider.
pub struct FilterState<F> {
    current: Option<F>,
    generation: u64,
    next_listener: u64,
    listeners: Vec<(ListenerId, RefreshListener)>,
}

impl<F> FilterState<F> {
    /// Start with an optional default filter, used until one is set.
    pub fn new(default: Option<F>) -> Self {
        Self {
            current: default,
            generation: 0,
            next_listener: 0,
            listeners: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&F> {
        self.current.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Replace the active filter and notify listeners.
    pub fn set(&mut self, filter: F) -> RefreshEvent {
        self.current = Some(filter);
        self.emit(RefreshReason::FilterReplaced)
    }

    /// Signal that backend data changed while the filter stayed the same.
    pub fn refresh_all(&mut self) -> RefreshEvent {
        self.emit(RefreshReason::DataChanged)
    }

    pub fn on_refresh(
        &mut self,
        listener: impl Fn(&RefreshEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the listener was already gone.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// An explicit filter wins over the active one; having neither is a caller error.
    pub fn resolve<'a>(&'a self, explicit: Option<&'a F>) -> PagingResult<&'a F> {
        explicit
            .or(self.current.as_ref())
            .ok_or(PagingError::MissingFilter)
    }

    fn emit(&mut self, reason: RefreshReason) -> RefreshEvent {
        self.generation += 1;
        let event = RefreshEvent {
            generation: self.generation,
            reason,
        };
        tracing::debug!(
            generation = event.generation,
            reason = ?event.reason,
            listeners = self.listeners.len(),
            "result set invalidated"
        );
        for (_, listener) in &self.listeners {
            listener(&event);
        }
        event
    }
}

impl<F> Default for FilterState<F> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<F: fmt::Debug> fmt::Debug for FilterState<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterState")
            .field("current", &self.current)
            .field("generation", &self.generation)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
