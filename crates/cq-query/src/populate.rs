//! Relation Population
//!
//! Which relations are loaded alongside the main entries, keyed by relation
//! attribute name. A root wildcard populates everything and overrides every
//! keyed entry.

use crate::query::QueryTree;

/// How a single relation is populated
#[derive(Debug, Clone, PartialEq)]
pub enum PopulateValue {
    /// Populate with the default shape
    True,
    /// Populate with a relation-scoped query
    Nested(Box<QueryTree>),
    /// Polymorphic relation populated per component type
    DynamicZone(Vec<(String, QueryTree)>),
}

impl PopulateValue {
    pub fn nested(tree: QueryTree) -> Self {
        Self::Nested(Box::new(tree))
    }

    /// Query for one component of a dynamic zone
    pub fn component(&self, component: &str) -> Option<&QueryTree> {
        match self {
            Self::DynamicZone(components) => components
                .iter()
                .find(|(key, _)| key == component)
                .map(|(_, tree)| tree),
            _ => None,
        }
    }
}

/// A keyed population entry
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateEntry {
    pub key: String,
    pub value: PopulateValue,
}

/// Population of a query
#[derive(Debug, Clone, PartialEq)]
pub enum Population {
    /// Ordered, keyed relation entries
    Keyed(Vec<PopulateEntry>),
    /// Populate everything
    All,
}

impl Default for Population {
    fn default() -> Self {
        Self::Keyed(vec![])
    }
}

impl Population {
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Keyed(entries) => entries.is_empty(),
            Self::All => false,
        }
    }

    /// Keyed entries; empty when populating everything
    pub fn entries(&self) -> &[PopulateEntry] {
        match self {
            Self::Keyed(entries) => entries,
            Self::All => &[],
        }
    }

    pub fn get(&self, key: &str) -> Option<&PopulateValue> {
        self.entries()
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// Switch to wildcard population, discarding keyed entries
    pub fn set_all(&mut self) {
        *self = Self::All;
    }

    /// Insert or overwrite a keyed entry in place.
    ///
    /// Returns false when the wildcard is set; keyed entries are ignored then.
    pub fn insert(&mut self, key: impl Into<String>, value: PopulateValue) -> bool {
        let Self::Keyed(entries) = self else {
            return false;
        };

        let key = key.into();
        match entries.iter_mut().find(|entry| entry.key == key) {
            Some(existing) => existing.value = value,
            None => entries.push(PopulateEntry { key, value }),
        }
        true
    }

    /// Insert or overwrite one component of a dynamic zone.
    ///
    /// An entry under `key` that is not a dynamic zone is replaced by a zone
    /// holding only this component.
    pub fn insert_component(
        &mut self,
        key: impl Into<String>,
        component: impl Into<String>,
        tree: QueryTree,
    ) -> bool {
        let Self::Keyed(entries) = self else {
            return false;
        };

        let key = key.into();
        let component = component.into();
        match entries.iter_mut().find(|entry| entry.key == key) {
            Some(PopulateEntry {
                value: PopulateValue::DynamicZone(components),
                ..
            }) => match components.iter_mut().find(|(name, _)| *name == component) {
                Some(existing) => existing.1 = tree,
                None => components.push((component, tree)),
            },
            Some(existing) => existing.value = PopulateValue::DynamicZone(vec![(component, tree)]),
            None => entries.push(PopulateEntry {
                key,
                value: PopulateValue::DynamicZone(vec![(component, tree)]),
            }),
        }
        true
    }

    /// Keyed merge of a donor population; a wildcard on either side wins.
    ///
    /// Dynamic zones merge per component, so receiver components the donor
    /// does not mention survive.
    pub fn merge_from(&mut self, donor: &Population) {
        let entries = match donor {
            Population::All => {
                self.set_all();
                return;
            }
            Population::Keyed(entries) => entries,
        };

        for entry in entries {
            match &entry.value {
                PopulateValue::DynamicZone(components) => {
                    for (component, tree) in components {
                        self.insert_component(entry.key.clone(), component.clone(), tree.clone());
                    }
                }
                value => {
                    self.insert(entry.key.clone(), value.clone());
                }
            }
        }
    }
}
