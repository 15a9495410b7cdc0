//! Query Builder
//!
//! Fluent API that mutates a [`QueryTree`] in place. The builder owns a
//! cursor: the path of the filter group currently appended to, plus the
//! pending modifiers (open attribute, negate-next, last sort key) that the
//! following calls consume.
//!
//! Nothing here fails. Calls that do not fit the current state are dropped
//! and logged at debug level.

use std::borrow::Cow;

use cq_core::{BuilderConfig, Dialect, PublicationState, SortDirection};
use serde_json::Value;
use tracing::{debug, warn};

use crate::compile::{compile, CompiledQuery};
use crate::dialect::serialize;
use crate::filters::{AttributeLeaf, Combinator, FilterNode, LogicalGroup, Operator, RelationScope};
use crate::merge;
use crate::populate::PopulateValue;
use crate::query::QueryTree;
use crate::sorts::SortEntry;

/// What the next filter modifier applies to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Target {
    #[default]
    None,
    /// An attribute waiting for its operator
    Attribute(String),
    /// The current scope itself
    Scope,
}

#[derive(Debug, Clone, Default)]
struct Cursor {
    /// Child indices from the root group to the current scope
    scope: Vec<usize>,
    target: Target,
    negate_next: bool,
    sort_key: Option<String>,
}

/// Whether the builder drives a root query or a population scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum ScopeKind {
    #[default]
    Root,
    Population,
}

/// Builder for constructing query trees fluently
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    config: BuilderConfig,
    tree: QueryTree,
    cursor: Cursor,
    kind: ScopeKind,
    read_only: bool,
}

impl QueryBuilder {
    /// Create a new query builder with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new query builder with an explicit configuration
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    fn nested(config: BuilderConfig) -> Self {
        Self {
            config,
            kind: ScopeKind::Population,
            ..Default::default()
        }
    }

    /// Get the builder configuration
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Check if the builder has been frozen
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Freeze the builder; every later mutation is ignored
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    fn apply(mut self, operation: &'static str, f: impl FnOnce(&mut Self)) -> Self {
        if self.read_only {
            debug!(operation, "Ignoring mutation on read-only builder");
            return self;
        }
        f(&mut self);
        self
    }

    /// Root-only operations are ignored inside population and filter scopes
    fn in_nested_scope(&self) -> bool {
        self.kind == ScopeKind::Population || !self.cursor.scope.is_empty()
    }

    fn apply_root(self, operation: &'static str, f: impl FnOnce(&mut Self)) -> Self {
        self.apply(operation, |builder| {
            if builder.in_nested_scope() {
                debug!(operation, "Ignoring root-only operation inside nested scope");
                return;
            }
            f(builder);
        })
    }

    fn current_scope(&mut self) -> Option<&mut LogicalGroup> {
        self.tree.filters.scope_mut(&self.cursor.scope)
    }

    // Filter methods

    /// Open an attribute for the next operator call
    pub fn filters(self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        self.apply("filters", |builder| {
            builder.cursor.target = Target::Attribute(attribute);
        })
    }

    /// Target the current logical scope itself with the next modifier
    pub fn filter_scope(self) -> Self {
        self.apply("filter_scope", |builder| {
            builder.cursor.target = Target::Scope;
        })
    }

    /// Negate the next attached leaf or nested scope, or the current scope
    /// when it is the target
    pub fn not(self) -> Self {
        self.apply("not", |builder| {
            if builder.cursor.target == Target::Scope {
                builder.cursor.target = Target::None;
                if let Some(scope) = builder.current_scope() {
                    scope.negated = !scope.negated;
                }
                return;
            }
            builder.cursor.negate_next = !builder.cursor.negate_next;
        })
    }

    /// Combine the current scope with AND
    pub fn and(self) -> Self {
        self.apply("and", |builder| builder.set_combinator(Combinator::And))
    }

    /// Combine the current scope with OR
    pub fn or(self) -> Self {
        self.apply("or", |builder| builder.set_combinator(Combinator::Or))
    }

    fn set_combinator(&mut self, combinator: Combinator) {
        if let Some(scope) = self.current_scope() {
            scope.combinator = combinator;
        }
    }

    /// Attach `operator value` to the open attribute
    pub fn operator(self, operator: Operator, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.apply("operator", |builder| builder.attach(operator, value))
    }

    fn attach(&mut self, operator: Operator, value: Value) {
        let attribute = match std::mem::take(&mut self.cursor.target) {
            Target::Attribute(attribute) => attribute,
            _ => {
                debug!(operator = %operator, "Dropping operator without an open attribute");
                return;
            }
        };
        let negated = std::mem::take(&mut self.cursor.negate_next);

        if !operator.accepts(&value) {
            warn!(
                attribute = %attribute,
                operator = %operator,
                value = %value,
                "Ignoring filter with a malformed value"
            );
            return;
        }

        let mut leaf = AttributeLeaf::new(attribute, operator, value);
        leaf.negated = negated;

        match self.current_scope() {
            Some(scope) => {
                if scope.attach_leaf(leaf) {
                    debug!("Overwrote filter with identical signature");
                }
            }
            None => warn!(scope = ?self.cursor.scope, "Filter cursor points at no group"),
        }
    }

    /// Filter by equality
    pub fn eq(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Eq, value)
    }

    /// Filter by case-insensitive equality
    pub fn eqi(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Eqi, value)
    }

    /// Filter by inequality
    pub fn ne(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Ne, value)
    }

    /// Filter by membership in a list of values
    pub fn in_(self, values: impl Into<Value>) -> Self {
        self.operator(Operator::In, values)
    }

    /// Filter by absence from a list of values
    pub fn not_in(self, values: impl Into<Value>) -> Self {
        self.operator(Operator::NotIn, values)
    }

    /// Filter by values lower than the operand
    pub fn lt(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Lt, value)
    }

    /// Filter by values lower than or equal to the operand
    pub fn lte(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Lte, value)
    }

    /// Filter by values greater than the operand
    pub fn gt(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Gt, value)
    }

    /// Filter by values greater than or equal to the operand
    pub fn gte(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Gte, value)
    }

    /// Inclusive range; ignored unless both bounds are given
    pub fn between(self, from: impl Into<Value>, to: impl Into<Value>) -> Self {
        self.operator(Operator::Between, Value::Array(vec![from.into(), to.into()]))
    }

    /// Filter by substring
    pub fn contains(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Contains, value)
    }

    /// Filter by absence of a substring
    pub fn not_contains(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::NotContains, value)
    }

    /// Filter by case-insensitive substring
    pub fn containsi(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::Containsi, value)
    }

    /// Filter by absence of a case-insensitive substring
    pub fn not_containsi(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::NotContainsi, value)
    }

    /// Filter by prefix
    pub fn starts_with(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::StartsWith, value)
    }

    /// Filter by case-insensitive prefix
    pub fn starts_withi(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::StartsWithi, value)
    }

    /// Filter by suffix
    pub fn ends_with(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::EndsWith, value)
    }

    /// Filter by case-insensitive suffix
    pub fn ends_withi(self, value: impl Into<Value>) -> Self {
        self.operator(Operator::EndsWithi, value)
    }

    /// Filter by null value
    pub fn null(self) -> Self {
        self.operator(Operator::Null, true)
    }

    /// Filter by non-null value
    pub fn not_null(self) -> Self {
        self.operator(Operator::NotNull, true)
    }

    /// Build a nested logical group inside the current scope
    pub fn filter_deep(self, build: impl FnOnce(Self) -> Self) -> Self {
        self.enter_scope(
            "filter_deep",
            |negated| {
                let mut group = LogicalGroup::and();
                group.negated = negated;
                FilterNode::Group(group)
            },
            build,
        )
    }

    /// Build a filter subtree addressed through a relation attribute
    pub fn filter_relation(self, attribute: impl Into<String>, build: impl FnOnce(Self) -> Self) -> Self {
        let attribute = attribute.into();
        self.enter_scope(
            "filter_relation",
            move |negated| {
                let mut scope = RelationScope::new(attribute);
                scope.subtree.negated = negated;
                FilterNode::Relation(scope)
            },
            build,
        )
    }

    fn enter_scope(
        mut self,
        operation: &'static str,
        node: impl FnOnce(bool) -> FilterNode,
        build: impl FnOnce(Self) -> Self,
    ) -> Self {
        if self.read_only {
            debug!(operation, "Ignoring mutation on read-only builder");
            return self;
        }

        self.cursor.target = Target::None;
        let negated = std::mem::take(&mut self.cursor.negate_next);
        let index = match self.current_scope() {
            Some(scope) => {
                scope.push(node(negated));
                scope.len() - 1
            }
            None => {
                warn!(operation, "Filter cursor points at no group");
                return self;
            }
        };

        self.cursor.scope.push(index);
        let mut this = build(self);
        this.close_scope();
        this
    }

    /// Leave the current scope, applying a dangling negation to it
    fn close_scope(&mut self) {
        if std::mem::take(&mut self.cursor.negate_next) && !self.read_only {
            if let Some(scope) = self.current_scope() {
                scope.negated = !scope.negated;
            }
        }
        self.cursor.target = Target::None;
        self.cursor.scope.pop();
    }

    // Field methods

    /// Select a field
    pub fn field(self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.apply("field", |builder| {
            builder.tree.fields.add(name);
        })
    }

    /// Select several fields
    pub fn fields<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply("fields", |builder| {
            for name in names {
                builder.tree.fields.add(name);
            }
        })
    }

    // Sort methods

    /// Sort by a path with the configured default direction
    pub fn sort(self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.apply("sort", |builder| {
            let direction = builder.config.default_sort;
            builder.tree.sort.insert(SortEntry::new(path.clone(), direction));
            builder.cursor.sort_key = Some(path);
        })
    }

    /// Sort by a path with an explicit direction
    pub fn sort_by(self, path: impl Into<String>, direction: SortDirection) -> Self {
        let path = path.into();
        self.apply("sort_by", |builder| {
            builder.tree.sort.insert(SortEntry::new(path.clone(), direction));
            builder.cursor.sort_key = Some(path);
        })
    }

    /// Add several sort entries in order
    pub fn sorts(self, entries: impl IntoIterator<Item = SortEntry>) -> Self {
        self.apply("sorts", |builder| {
            for entry in entries {
                builder.cursor.sort_key = Some(entry.path.clone());
                builder.tree.sort.insert(entry);
            }
        })
    }

    /// Set the direction of the last sorted path to ascending
    pub fn asc(self) -> Self {
        self.apply("asc", |builder| builder.set_direction(SortDirection::Asc))
    }

    /// Set the direction of the last sorted path to descending
    pub fn desc(self) -> Self {
        self.apply("desc", |builder| builder.set_direction(SortDirection::Desc))
    }

    fn set_direction(&mut self, direction: SortDirection) {
        match &self.cursor.sort_key {
            Some(path) => {
                self.tree.sort.set_direction(path, direction);
            }
            None => debug!(direction = %direction, "Dropping sort direction without a sort key"),
        }
    }

    // Population methods

    /// Populate a relation with its default shape
    pub fn populate(self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.apply("populate", |builder| builder.insert_population(key, PopulateValue::True))
    }

    /// Populate several relations with their default shape
    pub fn populate_many<I, S>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply("populate_many", |builder| {
            for key in keys {
                builder.insert_population(key.into(), PopulateValue::True);
            }
        })
    }

    /// Populate a relation with a relation-scoped query
    pub fn populate_with(self, key: impl Into<String>, build: impl FnOnce(Self) -> Self) -> Self {
        let key = key.into();
        self.apply("populate_with", |builder| {
            let nested = build(Self::nested(builder.config)).into_tree();
            builder.insert_population(key, PopulateValue::nested(nested));
        })
    }

    /// Populate one component type of a dynamic zone
    pub fn populate_dynamic(
        self,
        key: impl Into<String>,
        component: impl Into<String>,
        build: impl FnOnce(Self) -> Self,
    ) -> Self {
        let key = key.into();
        let component = component.into();
        self.apply("populate_dynamic", |builder| {
            let nested = build(Self::nested(builder.config)).into_tree();
            if !builder.tree.populate.insert_component(key, component, nested) {
                debug!("Ignoring dynamic zone population after populate_all");
            }
        })
    }

    /// Populate everything; overrides every keyed population
    pub fn populate_all(self) -> Self {
        self.apply_root("populate_all", |builder| builder.tree.populate.set_all())
    }

    fn insert_population(&mut self, key: String, value: PopulateValue) {
        if !self.tree.populate.insert(key, value) {
            debug!("Ignoring keyed population after populate_all");
        }
    }

    // Pagination methods

    /// Set the page number
    pub fn page(self, page: u64) -> Self {
        self.apply_root("page", |builder| builder.tree.pagination.set_page(page))
    }

    /// Set the number of entries per page
    pub fn page_size(self, page_size: u64) -> Self {
        self.apply_root("page_size", |builder| builder.tree.pagination.set_page_size(page_size))
    }

    /// Offset of the first entry
    pub fn page_start(self, start: u64) -> Self {
        self.apply_root("page_start", |builder| builder.tree.pagination.set_start(start))
    }

    /// Maximum number of entries
    pub fn page_limit(self, limit: u64) -> Self {
        self.apply_root("page_limit", |builder| builder.tree.pagination.set_limit(limit))
    }

    // Scalar metadata

    /// Set the content locale
    pub fn locale(self, locale: impl Into<String>) -> Self {
        let locale = locale.into();
        self.apply_root("locale", |builder| builder.tree.locale = Some(locale))
    }

    /// Set the publication state
    pub fn publication_state(self, state: PublicationState) -> Self {
        self.apply_root("publication_state", |builder| {
            builder.tree.publication_state = Some(state)
        })
    }

    /// Attach an opaque payload; carried by the serializer, dropped by the compiler
    pub fn data(self, data: impl Into<Value>) -> Self {
        let data = data.into();
        self.apply_root("data", |builder| builder.tree.data = Some(data))
    }

    // Join methods

    /// Join the donor's filters into this builder's root
    pub fn join_filters(self, donor: &QueryBuilder, merge_root_logical: bool) -> Self {
        let donor = donor.tree();
        self.apply("join_filters", |builder| {
            let shift = merge::join_filters(&mut builder.tree.filters, &donor.filters, merge_root_logical);
            builder.shift_cursor(shift);
        })
    }

    /// Join the donor's field selection
    pub fn join_fields(self, donor: &QueryBuilder) -> Self {
        self.apply("join_fields", |builder| {
            merge::join_fields(&mut builder.tree.fields, &donor.tree.fields)
        })
    }

    /// Join the donor's sort entries
    pub fn join_sort(self, donor: &QueryBuilder) -> Self {
        self.apply("join_sort", |builder| merge::join_sort(&mut builder.tree.sort, &donor.tree.sort))
    }

    /// Join the donor's population
    pub fn join_populate(self, donor: &QueryBuilder) -> Self {
        self.apply("join_populate", |builder| {
            merge::join_populate(&mut builder.tree.populate, &donor.tree.populate)
        })
    }

    /// Join the donor's pagination
    pub fn join_pagination(self, donor: &QueryBuilder) -> Self {
        self.apply_root("join_pagination", |builder| {
            merge::join_pagination(&mut builder.tree.pagination, &donor.tree.pagination)
        })
    }

    /// Join filters, fields, sort, population and pagination
    pub fn join_all(self, donor: &QueryBuilder, merge_root_logical: bool) -> Self {
        self.join_filters(donor, merge_root_logical)
            .join_fields(donor)
            .join_sort(donor)
            .join_populate(donor)
            .join_pagination(donor)
    }

    /// Keep the cursor on the same group after children were placed in
    /// front of the root's existing children
    fn shift_cursor(&mut self, shift: usize) {
        if let Some(first) = self.cursor.scope.first_mut() {
            *first += shift;
        }
    }

    // Output

    fn negates_root(&self) -> bool {
        self.cursor.negate_next && self.cursor.scope.is_empty() && !self.read_only
    }

    /// The finalized tree: a dangling root negation wraps the root group
    pub fn tree(&self) -> Cow<'_, QueryTree> {
        if self.negates_root() {
            let mut tree = self.tree.clone();
            tree.filters.negated = !tree.filters.negated;
            Cow::Owned(tree)
        } else {
            Cow::Borrowed(&self.tree)
        }
    }

    /// Consume the builder, returning the finalized tree
    pub fn into_tree(mut self) -> QueryTree {
        if self.negates_root() {
            self.tree.filters.negated = !self.tree.filters.negated;
        }
        self.tree
    }

    /// Build for the configured default dialect
    pub fn build(&self) -> Value {
        self.build_for(self.config.default_dialect)
    }

    /// Build for an explicit dialect
    pub fn build_for(&self, dialect: Dialect) -> Value {
        serialize(&self.tree(), dialect)
    }

    /// Build for the service dialect
    pub fn build_service(&self) -> Value {
        self.build_for(Dialect::Service)
    }

    /// Build for the entity dialect
    pub fn build_entity(&self) -> Value {
        self.build_for(Dialect::Entity)
    }

    /// Build for the engine dialect
    pub fn build_engine(&self) -> Value {
        self.build_for(Dialect::Engine)
    }

    /// Build for the REST dialect
    pub fn build_rest(&self) -> Value {
        self.build_for(Dialect::Rest)
    }

    /// Compile into source text with interned literals
    pub fn compile(&self) -> CompiledQuery {
        compile(&self.tree())
    }
}
