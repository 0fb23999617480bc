use thiserror::Error;

/// Caller-side contract violations detected by the adapter.
///
/// Backend failures never appear here: they travel unchanged in the backend's
/// own error type, which must be constructible from this one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PagingError {
    #[error("window count must be at least 1")]
    ZeroCount,

    #[error("window [{offset}, +{count}) overflows the index space")]
    WindowOverflow { offset: u64, count: u64 },

    #[error("page size must be at least 1")]
    ZeroPageSize,

    #[error("window offset {offset} lies before page start {page_start}")]
    WindowOutsidePage { offset: u64, page_start: u64 },

    #[error("window end {end} lies past page end {page_end}")]
    WindowPastPageEnd { end: u64, page_end: u64 },

    #[error("page {page_number} of size {page_size} ends past the index space")]
    PageOverflow { page_number: u64, page_size: u64 },

    #[error("no filter supplied and no filter is active")]
    MissingFilter,

    #[error("invalid sort token: '{0}'")]
    InvalidSortToken(String),
}

pub type PagingResult<T> = Result<T, PagingError>;
