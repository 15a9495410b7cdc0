//! Query Tree
//!
//! The aggregate a builder mutates and the serializer and compiler read:
//! filters, field selection, sort, population, pagination, plus locale,
//! publication state and an opaque data payload.

use cq_core::{Pagination, PublicationState};
use serde_json::Value;

use crate::fields::FieldSelection;
use crate::filters::{FilterNode, LogicalGroup};
use crate::populate::{PopulateValue, Population};
use crate::sorts::{SortEntry, SortList};

/// A query description
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryTree {
    /// Root logical group of the filters
    pub filters: LogicalGroup,
    /// Selected fields
    pub fields: FieldSelection,
    /// Sort order
    pub sort: SortList,
    /// Relation population
    pub populate: Population,
    /// Pagination
    pub pagination: Pagination,
    /// Content locale
    pub locale: Option<String>,
    /// Draft/published variant
    pub publication_state: Option<PublicationState>,
    /// Opaque payload carried to the API untouched
    pub data: Option<Value>,
}

impl QueryTree {
    /// Create an empty query tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter node to the root group
    pub fn with_filter(mut self, node: FilterNode) -> Self {
        self.filters.push(node);
        self
    }

    /// Set the root filter group
    pub fn with_filters(mut self, filters: LogicalGroup) -> Self {
        self.filters = filters;
        self
    }

    /// Select a field
    pub fn with_field(mut self, name: impl Into<String>) -> Self {
        self.fields.add(name);
        self
    }

    /// Add a sort entry
    pub fn with_sort(mut self, entry: SortEntry) -> Self {
        self.sort.insert(entry);
        self
    }

    /// Set the sort order
    pub fn with_sorts(mut self, sort: SortList) -> Self {
        self.sort = sort;
        self
    }

    /// Populate a relation
    pub fn with_populate(mut self, key: impl Into<String>, value: PopulateValue) -> Self {
        self.populate.insert(key, value);
        self
    }

    /// Set pagination
    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Set the locale
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Set the publication state
    pub fn with_publication_state(mut self, state: PublicationState) -> Self {
        self.publication_state = Some(state);
        self
    }

    /// Check if this query has any filters
    pub fn has_filters(&self) -> bool {
        !self.filters.is_empty()
    }

    /// Check if this query has a custom sort
    pub fn has_sort(&self) -> bool {
        !self.sort.is_empty()
    }

    /// Check if this query populates anything
    pub fn has_populate(&self) -> bool {
        !self.populate.is_empty()
    }

    /// Check if nothing at all has been set
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.fields.is_empty()
            && self.sort.is_empty()
            && self.populate.is_empty()
            && self.pagination.is_empty()
            && self.locale.is_none()
            && self.publication_state.is_none()
            && self.data.is_none()
    }
}
