//! # cq-query
//!
//! Fluent query builder for headless content APIs.
//!
//! A [`QueryBuilder`] mutates a [`QueryTree`] through a cursor. The tree is
//! then either serialized into the plain nested value one of the wire
//! dialects expects, or compiled into source text with repeated field and
//! sort lists interned as named constants.
//!
//! ## Structure
//!
//! - `filters` - Operators, attribute leaves and logical groups
//! - `sorts` - Ordered, keyed sort entries
//! - `fields` - Field selection
//! - `populate` - Relation population
//! - `query` - The query tree
//! - `merge` - Joining one query tree into another
//! - `dialect` - Serialization per wire dialect
//! - `compile` - Source emission with literal interning
//! - `builder` - Fluent API for constructing queries
//!
//! ## Example
//!
//! ```
//! use cq_query::QueryBuilder;
//! use serde_json::json;
//!
//! let query = QueryBuilder::new()
//!     .filters("title")
//!     .not()
//!     .eq("draft")
//!     .fields(["title", "slug"])
//!     .sort("publishedAt")
//!     .desc()
//!     .populate("author")
//!     .page(1)
//!     .page_size(10);
//!
//! assert_eq!(
//!     query.build_rest(),
//!     json!({
//!         "filters": {"$and": [{"title": {"$not": {"$eq": "draft"}}}]},
//!         "fields": ["title", "slug"],
//!         "sort": ["publishedAt:desc"],
//!         "populate": {"author": true},
//!         "pagination": {"page": 1, "pageSize": 10, "withCount": true}
//!     })
//! );
//! ```

pub mod filters;
pub mod sorts;
pub mod fields;
pub mod populate;
pub mod query;
pub mod merge;
pub mod dialect;
pub mod compile;
pub mod builder;

// Re-exports for convenience
pub use filters::{AttributeLeaf, Combinator, FilterNode, LogicalGroup, Operator, RelationScope};
pub use sorts::{SortEntry, SortList};
pub use fields::FieldSelection;
pub use populate::{PopulateEntry, PopulateValue, Population};
pub use query::QueryTree;
pub use dialect::serialize;
pub use compile::{compile, CompiledQuery};
pub use builder::QueryBuilder;

pub use cq_core::{BuilderConfig, Dialect, Pagination, PublicationState, QueryError, QueryResult, SortDirection};
