//! Field Selection
//!
//! The attributes a query returns. An ordered set: the first insertion of a
//! name fixes its position, later duplicates are no-ops.

use std::collections::BTreeSet;

/// Ordered set of selected attribute names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    names: Vec<String>,
}

impl FieldSelection {
    /// Create a new empty selection
    pub fn new() -> Self {
        Self { names: vec![] }
    }

    /// Add a field; returns false when it was already selected
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.has_field(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Add a field (builder pattern)
    pub fn with(mut self, name: impl Into<String>) -> Self {
        self.add(name);
        self
    }

    /// Keyed merge of a donor selection: our order first, donor's new
    /// names appended in donor order
    pub fn merge_from(&mut self, donor: &FieldSelection) {
        for name in donor.names() {
            self.add(name.as_str());
        }
    }

    /// Get all field names in selection order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Order-insensitive view of the selection
    pub fn name_set(&self) -> BTreeSet<&str> {
        self.names.iter().map(String::as_str).collect()
    }

    /// Check if any fields are selected
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Get number of selected fields
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if a specific field is selected
    pub fn has_field(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSelection {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut selection = Self::new();
        for name in iter {
            selection.add(name);
        }
        selection
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_selection() {
        let fields = FieldSelection::new().with("title").with("slug").with("title");

        assert_eq!(fields.len(), 2);
        assert!(fields.has_field("title"));
        assert!(!fields.has_field("body"));
        assert_eq!(fields.names(), &["title".to_string(), "slug".to_string()]);
    }

    #[test]
    fn test_duplicate_is_noop() {
        let mut fields = FieldSelection::new();
        assert!(fields.add("a"));
        assert!(fields.add("b"));
        assert!(!fields.add("a"));
        assert_eq!(fields.names(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_merge_from() {
        let mut receiver: FieldSelection = ["a", "b"].into_iter().collect();
        let donor: FieldSelection = ["c", "a", "d"].into_iter().collect();
        receiver.merge_from(&donor);

        assert_eq!(receiver.names(), &["a", "b", "c", "d"].map(String::from));
        assert_eq!(donor.len(), 3);
    }

    #[test]
    fn test_name_set_ignores_order() {
        let left: FieldSelection = ["x", "y"].into_iter().collect();
        let right: FieldSelection = ["y", "x"].into_iter().collect();
        assert_ne!(left, right);
        assert_eq!(left.name_set(), right.name_set());
    }
}
