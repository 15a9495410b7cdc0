//! Query Filters
//!
//! The filter tree: attribute leaves combined by logical groups, with
//! relation scopes addressing a subtree through a related attribute.
//!
//! Every dialect shares the same filter shape, so rendering to a plain value
//! lives here and is reused by the serializer and the compiler.

use std::fmt;
use std::str::FromStr;

use cq_core::QueryError;
use serde_json::{Map, Value};

/// Filter operators that can be applied to an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Equals
    Eq,
    /// Equals, case insensitive
    Eqi,
    /// Not equals
    Ne,
    /// Included in a list
    In,
    /// Not included in a list
    NotIn,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Between two values (inclusive)
    Between,
    Contains,
    NotContains,
    /// Contains, case insensitive
    Containsi,
    /// Does not contain, case insensitive
    NotContainsi,
    StartsWith,
    /// Starts with, case insensitive
    StartsWithi,
    EndsWith,
    /// Ends with, case insensitive
    EndsWithi,
    /// Is null
    Null,
    /// Is not null
    NotNull,
}

impl Operator {
    pub const ALL: [Operator; 20] = [
        Self::Eq,
        Self::Eqi,
        Self::Ne,
        Self::In,
        Self::NotIn,
        Self::Lt,
        Self::Lte,
        Self::Gt,
        Self::Gte,
        Self::Between,
        Self::Contains,
        Self::NotContains,
        Self::Containsi,
        Self::NotContainsi,
        Self::StartsWith,
        Self::StartsWithi,
        Self::EndsWith,
        Self::EndsWithi,
        Self::Null,
        Self::NotNull,
    ];

    /// Operator name without the `$` prefix
    pub fn name(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Eqi => "eqi",
            Self::Ne => "ne",
            Self::In => "in",
            Self::NotIn => "notIn",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Between => "between",
            Self::Contains => "contains",
            Self::NotContains => "notContains",
            Self::Containsi => "containsi",
            Self::NotContainsi => "notContainsi",
            Self::StartsWith => "startsWith",
            Self::StartsWithi => "startsWithi",
            Self::EndsWith => "endsWith",
            Self::EndsWithi => "endsWithi",
            Self::Null => "null",
            Self::NotNull => "notNull",
        }
    }

    /// Key used on the wire, e.g. `$eq`
    pub fn wire_key(&self) -> String {
        format!("${}", self.name())
    }

    /// Check whether a value is acceptable for this operator
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Between => matches!(value, Value::Array(items) if items.len() == 2),
            _ => true,
        }
    }
}

impl FromStr for Operator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_prefix('$').unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|op| op.name() == name)
            .ok_or_else(|| QueryError::UnknownOperator(s.to_string()))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name())
    }
}

/// Logical combinator of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    pub fn wire_key(&self) -> &'static str {
        match self {
            Self::And => "$and",
            Self::Or => "$or",
        }
    }
}

/// A single attribute condition
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeLeaf {
    /// Dot-separated attribute path
    pub path: String,
    pub operator: Operator,
    pub value: Value,
    pub negated: bool,
}

impl AttributeLeaf {
    pub fn new(path: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            operator,
            value: value.into(),
            negated: false,
        }
    }

    /// Wrap in a negation
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Two leaves with the same signature address the same condition slot
    pub fn same_signature(&self, other: &AttributeLeaf) -> bool {
        self.path == other.path && self.operator == other.operator && self.negated == other.negated
    }

    pub fn to_value(&self) -> Value {
        let mut condition = Map::new();
        condition.insert(self.operator.wire_key(), self.value.clone());
        let mut inner = Value::Object(condition);
        if self.negated {
            inner = wrap("$not", inner);
        }
        nest_path(&self.path, inner)
    }
}

/// A filter subtree addressed through a relation attribute
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationScope {
    pub attribute_path: String,
    pub subtree: LogicalGroup,
}

impl RelationScope {
    pub fn new(attribute_path: impl Into<String>) -> Self {
        Self {
            attribute_path: attribute_path.into(),
            subtree: LogicalGroup::default(),
        }
    }

    pub fn to_value(&self) -> Option<Value> {
        self.subtree
            .to_value()
            .map(|inner| nest_path(&self.attribute_path, inner))
    }
}

/// A child of a logical group
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Leaf(AttributeLeaf),
    Group(LogicalGroup),
    Relation(RelationScope),
}

impl FilterNode {
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Leaf(leaf) => Some(leaf.to_value()),
            Self::Group(group) => group.to_value(),
            Self::Relation(scope) => scope.to_value(),
        }
    }

    /// The group a cursor enters when descending into this node
    fn scope_group_mut(&mut self) -> Option<&mut LogicalGroup> {
        match self {
            Self::Leaf(_) => None,
            Self::Group(group) => Some(group),
            Self::Relation(scope) => Some(&mut scope.subtree),
        }
    }
}

/// An ordered list of children combined by AND/OR
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LogicalGroup {
    pub combinator: Combinator,
    pub children: Vec<FilterNode>,
    pub negated: bool,
}

impl LogicalGroup {
    pub fn new(combinator: Combinator) -> Self {
        Self {
            combinator,
            children: vec![],
            negated: false,
        }
    }

    pub fn and() -> Self {
        Self::new(Combinator::And)
    }

    pub fn or() -> Self {
        Self::new(Combinator::Or)
    }

    /// Add a child (builder pattern)
    pub fn with(mut self, node: FilterNode) -> Self {
        self.children.push(node);
        self
    }

    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn push(&mut self, node: FilterNode) {
        self.children.push(node);
    }

    /// Attach a leaf, overwriting the value of an existing leaf with the
    /// same signature in place. Returns true when an existing leaf was hit.
    pub fn attach_leaf(&mut self, leaf: AttributeLeaf) -> bool {
        let position = self.children.iter().position(|child| {
            matches!(child, FilterNode::Leaf(current) if current.same_signature(&leaf))
        });

        match position {
            Some(index) => {
                if let FilterNode::Leaf(current) = &mut self.children[index] {
                    current.value = leaf.value;
                }
                true
            }
            None => {
                self.children.push(FilterNode::Leaf(leaf));
                false
            }
        }
    }

    /// Resolve a scope path (child indices) to the group it addresses
    pub fn scope_mut(&mut self, path: &[usize]) -> Option<&mut LogicalGroup> {
        let mut group = self;
        for &index in path {
            group = group.children.get_mut(index)?.scope_group_mut()?;
        }
        Some(group)
    }

    /// Render to a plain value; `None` when there is nothing to filter on
    pub fn to_value(&self) -> Option<Value> {
        let children: Vec<Value> = self.children.iter().filter_map(FilterNode::to_value).collect();
        if children.is_empty() {
            return None;
        }

        let group = wrap(self.combinator.wire_key(), Value::Array(children));
        Some(if self.negated { wrap("$not", group) } else { group })
    }
}

fn wrap(key: &str, inner: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), inner);
    Value::Object(map)
}

/// `a.b.c` + inner => `{a: {b: {c: inner}}}`
fn nest_path(path: &str, inner: Value) -> Value {
    path.rsplit('.')
        .filter(|segment| !segment.is_empty())
        .fold(inner, |acc, segment| wrap(segment, acc))
}
