//! Dialect Serializer
//!
//! Renders a query tree into the plain nested value one of the wire
//! dialects expects. Pure: the tree is only read. Sections a dialect does
//! not support, and empty sections, are omitted rather than rejected.

use cq_core::{Dialect, Pagination};
use serde_json::{json, Map, Value};

use crate::populate::{PopulateValue, Population};
use crate::query::QueryTree;
use crate::sorts::SortList;

/// Top-level key names of a dialect
struct Keys {
    filters: &'static str,
    fields: &'static str,
    sort: &'static str,
}

fn keys(dialect: Dialect) -> Keys {
    match dialect {
        Dialect::Engine => Keys {
            filters: "where",
            fields: "select",
            sort: "orderBy",
        },
        Dialect::Service | Dialect::Entity | Dialect::Rest => Keys {
            filters: "filters",
            fields: "fields",
            sort: "sort",
        },
    }
}

/// Serialize a query tree for a dialect
pub fn serialize(tree: &QueryTree, dialect: Dialect) -> Value {
    Value::Object(serialize_scope(tree, dialect, false))
}

fn serialize_scope(tree: &QueryTree, dialect: Dialect, nested: bool) -> Map<String, Value> {
    let keys = keys(dialect);
    let mut out = Map::new();

    if let Some(filters) = tree.filters.to_value() {
        out.insert(keys.filters.to_string(), filters);
    }

    if !tree.fields.is_empty() {
        out.insert(keys.fields.to_string(), json!(tree.fields.names()));
    }

    if !tree.sort.is_empty() {
        out.insert(keys.sort.to_string(), sort_value(&tree.sort, dialect));
    }

    if let Some(populate) = populate_value(&tree.populate, dialect) {
        out.insert("populate".to_string(), populate);
    }

    // Population scopes only carry filters, fields, sort and populate
    if nested {
        return out;
    }

    write_pagination(&mut out, &tree.pagination, dialect);

    if dialect.supports_locale() {
        if let Some(locale) = &tree.locale {
            out.insert("locale".to_string(), json!(locale));
        }
        if let Some(state) = tree.publication_state {
            out.insert("publicationState".to_string(), json!(state.as_str()));
        }
    }

    if let Some(data) = &tree.data {
        out.insert("data".to_string(), data.clone());
    }

    out
}

pub(crate) fn sort_value(sort: &SortList, dialect: Dialect) -> Value {
    let entries = sort.entries().iter().map(|entry| match dialect {
        Dialect::Rest => json!(entry.to_rest()),
        _ => {
            let mut object = Map::new();
            object.insert(entry.path.clone(), json!(entry.direction.as_str()));
            Value::Object(object)
        }
    });
    Value::Array(entries.collect())
}

fn populate_value(population: &Population, dialect: Dialect) -> Option<Value> {
    match population {
        Population::All => Some(json!("*")),
        Population::Keyed(entries) if entries.is_empty() => None,
        Population::Keyed(entries) => {
            let mut out = Map::new();
            for entry in entries {
                out.insert(entry.key.clone(), populate_entry_value(&entry.value, dialect));
            }
            Some(Value::Object(out))
        }
    }
}

fn populate_entry_value(value: &PopulateValue, dialect: Dialect) -> Value {
    match value {
        PopulateValue::True => Value::Bool(true),
        PopulateValue::Nested(tree) => nested_value(tree, dialect),
        PopulateValue::DynamicZone(components) => {
            let mut on = Map::new();
            for (component, tree) in components {
                on.insert(component.clone(), nested_value(tree, dialect));
            }
            json!({ "on": on })
        }
    }
}

fn nested_value(tree: &QueryTree, dialect: Dialect) -> Value {
    let scope = serialize_scope(tree, dialect, true);
    if scope.is_empty() {
        Value::Bool(true)
    } else {
        Value::Object(scope)
    }
}

fn write_pagination(out: &mut Map<String, Value>, pagination: &Pagination, dialect: Dialect) {
    if pagination.is_empty() {
        return;
    }

    let (first, second) = match (pagination, dialect) {
        (Pagination::Page { page, page_size }, _) => (("page", *page), ("pageSize", *page_size)),
        (Pagination::Offset { start, limit }, Dialect::Engine) => (("offset", *start), ("limit", *limit)),
        (Pagination::Offset { start, limit }, _) => (("start", *start), ("limit", *limit)),
        (Pagination::Unset, _) => return,
    };

    let mut fields = Map::new();
    for (key, value) in [first, second] {
        if let Some(value) = value {
            fields.insert(key.to_string(), json!(value));
        }
    }

    match dialect {
        Dialect::Service => {
            out.insert("pagination".to_string(), Value::Object(fields));
        }
        Dialect::Rest => {
            fields.insert("withCount".to_string(), Value::Bool(true));
            out.insert("pagination".to_string(), Value::Object(fields));
        }
        Dialect::Entity | Dialect::Engine => out.extend(fields),
    }
}
