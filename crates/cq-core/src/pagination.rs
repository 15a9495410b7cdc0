//! Pagination model
//!
//! Two mutually exclusive families: page based (`page`/`pageSize`) and
//! offset based (`start`/`limit`). Writing a field of one family discards
//! whatever the other family held.

use serde::{Deserialize, Serialize};

/// Pagination family of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pagination {
    /// No pagination requested
    #[default]
    Unset,
    /// Page based pagination (1-indexed pages)
    Page {
        page: Option<u64>,
        page_size: Option<u64>,
    },
    /// Offset based pagination
    Offset {
        start: Option<u64>,
        limit: Option<u64>,
    },
}

impl Pagination {
    /// Page based pagination with both fields
    pub fn paged(page: u64, page_size: u64) -> Self {
        Self::Page {
            page: Some(page),
            page_size: Some(page_size),
        }
    }

    /// Offset based pagination with both fields
    pub fn offset(start: u64, limit: u64) -> Self {
        Self::Offset {
            start: Some(start),
            limit: Some(limit),
        }
    }

    pub fn set_page(&mut self, value: u64) {
        match self {
            Self::Page { page, .. } => *page = Some(value),
            _ => {
                *self = Self::Page {
                    page: Some(value),
                    page_size: None,
                }
            }
        }
    }

    pub fn set_page_size(&mut self, value: u64) {
        match self {
            Self::Page { page_size, .. } => *page_size = Some(value),
            _ => {
                *self = Self::Page {
                    page: None,
                    page_size: Some(value),
                }
            }
        }
    }

    pub fn set_start(&mut self, value: u64) {
        match self {
            Self::Offset { start, .. } => *start = Some(value),
            _ => {
                *self = Self::Offset {
                    start: Some(value),
                    limit: None,
                }
            }
        }
    }

    pub fn set_limit(&mut self, value: u64) {
        match self {
            Self::Offset { limit, .. } => *limit = Some(value),
            _ => {
                *self = Self::Offset {
                    start: None,
                    limit: Some(value),
                }
            }
        }
    }

    /// Check whether any pagination field is defined
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Unset => true,
            Self::Page { page, page_size } => page.is_none() && page_size.is_none(),
            Self::Offset { start, limit } => start.is_none() && limit.is_none(),
        }
    }

    pub fn is_page_based(&self) -> bool {
        matches!(self, Self::Page { .. })
    }

    pub fn is_offset_based(&self) -> bool {
        matches!(self, Self::Offset { .. })
    }

    /// Merge a donor pagination into this one.
    ///
    /// Same family: the donor's defined fields overwrite ours field by field.
    /// Other family: the donor's family replaces ours wholesale.
    pub fn merge_from(&mut self, donor: &Pagination) {
        match (self, donor) {
            (_, Pagination::Unset) => {}
            (
                Pagination::Page { page, page_size },
                Pagination::Page {
                    page: donor_page,
                    page_size: donor_size,
                },
            ) => {
                if donor_page.is_some() {
                    *page = *donor_page;
                }
                if donor_size.is_some() {
                    *page_size = *donor_size;
                }
            }
            (
                Pagination::Offset { start, limit },
                Pagination::Offset {
                    start: donor_start,
                    limit: donor_limit,
                },
            ) => {
                if donor_start.is_some() {
                    *start = *donor_start;
                }
                if donor_limit.is_some() {
                    *limit = *donor_limit;
                }
            }
            (receiver, donor) => *receiver = *donor,
        }
    }
}
