//! Caller sort state and its translation into the backend ordering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{PagingError, PagingResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    pub fn reverse(self) -> Self {
        match self {
            SortDir::Asc => SortDir::Desc,
            SortDir::Desc => SortDir::Asc,
        }
    }

    fn sign(self) -> char {
        match self {
            SortDir::Asc => '+',
            SortDir::Desc => '-',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: String,
    pub dir: SortDir,
}

impl SortOrder {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            dir: SortDir::Desc,
        }
    }
}

/// Ordered sort keys as the caller sees them; the first entry is the primary key.
/// Empty means "use the provider default".
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec(pub Vec<SortOrder>);

impl SortSpec {
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn then(mut self, order: SortOrder) -> Self {
        self.0.push(order);
        self
    }

    /// Compact form, e.g. `"+name,-created_at"`.
    pub fn to_signed_tokens(&self) -> String {
        self.0
            .iter()
            .map(|o| format!("{}{}", o.dir.sign(), o.field))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Parse the compact form. A missing sign means ascending, empty segments
    /// are skipped and an empty input yields an empty spec.
    pub fn from_signed_tokens(tokens: &str) -> PagingResult<Self> {
        let mut orders = Vec::new();
        for raw in tokens.split(',') {
            let seg = raw.trim();
            if seg.is_empty() {
                continue;
            }
            let (dir, field) = match seg.as_bytes()[0] {
                b'+' => (SortDir::Asc, &seg[1..]),
                b'-' => (SortDir::Desc, &seg[1..]),
                _ => (SortDir::Asc, seg),
            };
            let field = field.trim();
            if field.is_empty() || field.starts_with(['+', '-']) {
                return Err(PagingError::InvalidSortToken(seg.to_string()));
            }
            orders.push(SortOrder {
                field: field.to_string(),
                dir,
            });
        }
        Ok(Self(orders))
    }
}

impl From<Vec<SortOrder>> for SortSpec {
    fn from(orders: Vec<SortOrder>) -> Self {
        Self(orders)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(none)");
        }
        let parts = self
            .0
            .iter()
            .map(|o| {
                let dir = match o.dir {
                    SortDir::Asc => "asc",
                    SortDir::Desc => "desc",
                };
                format!("{} {}", o.field, dir)
            })
            .collect::<Vec<_>>();
        f.write_str(&parts.join(", "))
    }
}

/// Ordering as sent to the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "orders", rename_all = "snake_case")]
pub enum Sort {
    /// No explicit order; the backend applies its own (e.g. primary key).
    #[default]
    Unsorted,
    By(Vec<SortOrder>),
}

impl Sort {
    pub fn is_unsorted(&self) -> bool {
        matches!(self, Sort::Unsorted)
    }

    pub fn orders(&self) -> &[SortOrder] {
        match self {
            Sort::Unsorted => &[],
            Sort::By(orders) => orders,
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Unsorted => f.write_str("unsorted"),
            Sort::By(orders) => fmt::Display::fmt(&SortSpec(orders.clone()), f),
        }
    }
}

/// Caller orders win when present, otherwise the default applies; both empty
/// leaves the backend unsorted.
pub fn translate(sort_orders: &SortSpec, default_orders: &SortSpec) -> Sort {
    let chosen = if sort_orders.is_empty() {
        default_orders
    } else {
        sort_orders
    };
    if chosen.is_empty() {
        Sort::Unsorted
    } else {
        Sort::By(chosen.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_orders_take_precedence_and_keep_sequence() {
        let caller = SortSpec::empty()
            .then(SortOrder::desc("created_at"))
            .then(SortOrder::asc("id"));
        let default = SortSpec::empty().then(SortOrder::asc("name"));

        let sort = translate(&caller, &default);
        assert_eq!(sort.orders(), caller.0.as_slice());
        assert_eq!(sort.orders()[0].field, "created_at");
    }

    #[test]
    fn empty_caller_orders_use_default() {
        let default = SortSpec::empty().then(SortOrder::asc("name"));
        let sort = translate(&SortSpec::empty(), &default);
        assert_eq!(sort, Sort::By(vec![SortOrder::asc("name")]));
    }

    #[test]
    fn both_empty_is_unsorted() {
        let sort = translate(&SortSpec::empty(), &SortSpec::empty());
        assert!(sort.is_unsorted());
        assert!(sort.orders().is_empty());
    }

    #[test]
    fn signed_tokens_parse_and_format() {
        let spec = SortSpec::from_signed_tokens(" +email , -created_at,,id ").unwrap();
        assert_eq!(
            spec.0,
            vec![
                SortOrder::asc("email"),
                SortOrder::desc("created_at"),
                SortOrder::asc("id"),
            ]
        );
        assert_eq!(spec.to_signed_tokens(), "+email,-created_at,+id");
        assert_eq!(spec.to_string(), "email asc, created_at desc, id asc");
    }

    #[test]
    fn signed_tokens_reject_bare_signs() {
        for bad in ["+", "-", "+name,-", "--id"] {
            assert!(
                matches!(
                    SortSpec::from_signed_tokens(bad),
                    Err(PagingError::InvalidSortToken(_))
                ),
                "expected error for {bad:?}"
            );
        }
    }

    #[test]
    fn empty_tokens_are_an_empty_spec() {
        assert!(SortSpec::from_signed_tokens("").unwrap().is_empty());
        assert_eq!(SortSpec::empty().to_string(), "(none)");
    }
}
