//! Literal-Interning Compiler
//!
//! Turns a query tree into a TypeScript-style object literal where every
//! literal carries `as const`. Field and sort arrays that occur more than
//! once anywhere in the tree are hoisted into `listN` constants.
//!
//! Two passes over the same traversal order: the first counts canonical
//! literal keys, the second emits text and substitutes references. Field
//! arrays are keyed by their name set, sort arrays by their exact sequence.
//! The opaque `data` payload is never emitted.

use std::collections::{BTreeSet, HashMap};

use cq_core::{Pagination, SortDirection};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::fields::FieldSelection;
use crate::populate::{PopulateValue, Population};
use crate::query::QueryTree;
use crate::sorts::SortList;

/// Output of [`compile`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledQuery {
    /// Expression reconstructing the query
    pub query: String,
    /// Hoisted constant declarations, one per line
    pub constants: String,
}

type LiteralKey = [u8; 32];

const TAG_FIELDS: u8 = 0x01;
const TAG_SORT: u8 = 0x02;

#[derive(Clone, Copy)]
enum Literal<'a> {
    Fields(&'a FieldSelection),
    Sort(&'a SortList),
}

impl Literal<'_> {
    fn key(&self) -> LiteralKey {
        let mut hasher = Sha256::new();
        match self {
            Literal::Fields(fields) => {
                let names: BTreeSet<&str> = fields.name_set();
                hasher.update([TAG_FIELDS]);
                write_len(&mut hasher, names.len());
                for name in names {
                    write_str(&mut hasher, name);
                }
            }
            Literal::Sort(sort) => {
                hasher.update([TAG_SORT]);
                write_len(&mut hasher, sort.len());
                for entry in sort.entries() {
                    write_str(&mut hasher, &entry.path);
                    hasher.update([direction_tag(entry.direction)]);
                }
            }
        }
        let digest = hasher.finalize();
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        key
    }

    fn text(&self) -> String {
        match self {
            Literal::Fields(fields) => {
                let names: Vec<String> = fields.names().iter().map(|n| string_literal(n)).collect();
                format!("[{}] as const", names.join(", "))
            }
            Literal::Sort(sort) => {
                let entries: Vec<String> = sort
                    .entries()
                    .iter()
                    .map(|e| format!("{{ {}: {} }}", property_key(&e.path), string_literal(e.direction.as_str())))
                    .collect();
                format!("[{}] as const", entries.join(", "))
            }
        }
    }
}

fn direction_tag(direction: SortDirection) -> u8 {
    match direction {
        SortDirection::Asc => 0x10,
        SortDirection::Desc => 0x11,
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn write_len(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

/// Visit every field/sort literal in emission order
fn visit_literals<'a>(tree: &'a QueryTree, visit: &mut impl FnMut(Literal<'a>)) {
    if !tree.fields.is_empty() {
        visit(Literal::Fields(&tree.fields));
    }
    if !tree.sort.is_empty() {
        visit(Literal::Sort(&tree.sort));
    }
    for entry in tree.populate.entries() {
        match &entry.value {
            PopulateValue::True => {}
            PopulateValue::Nested(nested) => visit_literals(nested, visit),
            PopulateValue::DynamicZone(components) => {
                for (_, nested) in components {
                    visit_literals(nested, visit);
                }
            }
        }
    }
}

struct Emitter {
    counts: HashMap<LiteralKey, usize>,
    names: HashMap<LiteralKey, String>,
    declarations: Vec<String>,
}

impl Emitter {
    fn new(tree: &QueryTree) -> Self {
        let mut counts: HashMap<LiteralKey, usize> = HashMap::new();
        visit_literals(tree, &mut |literal| {
            *counts.entry(literal.key()).or_default() += 1;
        });

        Self {
            counts,
            names: HashMap::new(),
            declarations: vec![],
        }
    }

    fn literal(&mut self, literal: Literal<'_>) -> String {
        let key = literal.key();
        if self.counts.get(&key).copied().unwrap_or(0) < 2 {
            return literal.text();
        }

        if let Some(name) = self.names.get(&key) {
            return name.clone();
        }

        let name = format!("list{}", self.names.len() + 1);
        self.declarations
            .push(format!("const {} = {};", name, literal.text()));
        self.names.insert(key, name.clone());
        name
    }

    fn scope(&mut self, tree: &QueryTree, nested: bool) -> Vec<String> {
        let mut parts = vec![];

        if !tree.fields.is_empty() {
            parts.push(format!("fields: {}", self.literal(Literal::Fields(&tree.fields))));
        }

        if !tree.sort.is_empty() {
            parts.push(format!("sort: {}", self.literal(Literal::Sort(&tree.sort))));
        }

        if let Some(filters) = tree.filters.to_value() {
            parts.push(format!("filters: {}", typed_value(&filters)));
        }

        if let Some(populate) = self.population(&tree.populate) {
            parts.push(format!("populate: {}", populate));
        }

        if nested {
            return parts;
        }

        if let Some(pagination) = pagination_text(&tree.pagination) {
            parts.push(format!("pagination: {}", pagination));
        }

        if let Some(locale) = &tree.locale {
            parts.push(format!("locale: {} as const", string_literal(locale)));
        }

        if let Some(state) = tree.publication_state {
            parts.push(format!(
                "publicationState: {} as const",
                string_literal(state.as_str())
            ));
        }

        parts
    }

    fn population(&mut self, population: &Population) -> Option<String> {
        match population {
            Population::All => Some(format!("{} as const", string_literal("*"))),
            Population::Keyed(entries) if entries.is_empty() => None,
            Population::Keyed(entries) => {
                let parts: Vec<String> = entries
                    .iter()
                    .map(|entry| {
                        format!("{}: {}", property_key(&entry.key), self.populate_value(&entry.value))
                    })
                    .collect();
                Some(object(parts))
            }
        }
    }

    fn populate_value(&mut self, value: &PopulateValue) -> String {
        match value {
            PopulateValue::True => "true as const".to_string(),
            PopulateValue::Nested(tree) => self.nested(tree),
            PopulateValue::DynamicZone(components) => {
                let parts: Vec<String> = components
                    .iter()
                    .map(|(component, tree)| format!("{}: {}", property_key(component), self.nested(tree)))
                    .collect();
                format!("{{ on: {} }}", object(parts))
            }
        }
    }

    fn nested(&mut self, tree: &QueryTree) -> String {
        let parts = self.scope(tree, true);
        if parts.is_empty() {
            "true as const".to_string()
        } else {
            object(parts)
        }
    }
}

/// Compile a query tree into source text plus hoisted constants
pub fn compile(tree: &QueryTree) -> CompiledQuery {
    let mut emitter = Emitter::new(tree);
    let parts = emitter.scope(tree, false);
    let query = object(parts);

    debug!(
        constants = emitter.declarations.len(),
        distinct_literals = emitter.counts.len(),
        "Compiled query"
    );

    CompiledQuery {
        query,
        constants: emitter.declarations.join("\n"),
    }
}

fn pagination_text(pagination: &Pagination) -> Option<String> {
    let fields = match pagination {
        Pagination::Unset => return None,
        Pagination::Page { page, page_size } => [("page", *page), ("pageSize", *page_size)],
        Pagination::Offset { start, limit } => [("start", *start), ("limit", *limit)],
    };

    let parts: Vec<String> = fields
        .iter()
        .filter_map(|(key, value)| value.map(|v| format!("{}: {} as const", key, v)))
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(object(parts))
    }
}

/// Emit a plain value with literal types attached
fn typed_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => format!("{} as const", value),
        Value::Array(items) if items.iter().all(is_scalar) => {
            let items: Vec<String> = items.iter().map(Value::to_string).collect();
            format!("[{}] as const", items.join(", "))
        }
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(typed_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => object(
            map.iter()
                .map(|(key, value)| format!("{}: {}", property_key(key), typed_value(value)))
                .collect(),
        ),
    }
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

fn object(parts: Vec<String>) -> String {
    if parts.is_empty() {
        "{}".to_string()
    } else {
        format!("{{ {} }}", parts.join(", "))
    }
}

fn string_literal(value: &str) -> String {
    Value::String(value.to_string()).to_string()
}

/// Bare identifier when possible, quoted otherwise
fn property_key(key: &str) -> String {
    let mut chars = key.chars();
    let is_identifier = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };

    if is_identifier {
        key.to_string()
    } else {
        string_literal(key)
    }
}
