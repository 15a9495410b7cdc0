//! Query Sort Orders
//!
//! Sort entries are keyed by attribute path. The list order defines the
//! tie-break order of the target API and is preserved exactly.

use cq_core::{QueryError, QueryResult, SortDirection};

/// A single sort entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortEntry {
    /// The attribute path to sort by
    pub path: String,
    /// The sort direction
    pub direction: SortDirection,
}

impl SortEntry {
    /// Create a new sort entry
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }

    /// Create ascending sort
    pub fn asc(path: impl Into<String>) -> Self {
        Self::new(path, SortDirection::Asc)
    }

    /// Create descending sort
    pub fn desc(path: impl Into<String>) -> Self {
        Self::new(path, SortDirection::Desc)
    }

    /// Parse a REST style `path:direction` expression.
    ///
    /// A missing direction falls back to `default`.
    pub fn parse_rest(input: &str, default: SortDirection) -> QueryResult<Self> {
        let input = input.trim();
        let (path, direction) = match input.rsplit_once(':') {
            Some((path, direction)) => (path, direction.parse()?),
            None => (input, default),
        };

        if path.is_empty() {
            return Err(QueryError::InvalidSort {
                input: input.to_string(),
                message: "empty path".to_string(),
            });
        }

        Ok(Self::new(path, direction))
    }

    /// Render as a REST style `path:direction` string
    pub fn to_rest(&self) -> String {
        format!("{}:{}", self.path, self.direction)
    }
}

/// Ordered, path-keyed collection of sort entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortList {
    entries: Vec<SortEntry>,
}

impl SortList {
    /// Create a new empty sort list
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    /// Insert an entry; an existing path keeps its position and takes the
    /// new direction
    pub fn insert(&mut self, entry: SortEntry) -> &mut Self {
        match self.entries.iter_mut().find(|e| e.path == entry.path) {
            Some(existing) => existing.direction = entry.direction,
            None => self.entries.push(entry),
        }
        self
    }

    /// Insert an entry (builder pattern)
    pub fn then(mut self, entry: SortEntry) -> Self {
        self.insert(entry);
        self
    }

    /// Add ascending sort
    pub fn then_asc(self, path: impl Into<String>) -> Self {
        self.then(SortEntry::asc(path))
    }

    /// Add descending sort
    pub fn then_desc(self, path: impl Into<String>) -> Self {
        self.then(SortEntry::desc(path))
    }

    /// Set the direction of an existing entry
    pub fn set_direction(&mut self, path: &str, direction: SortDirection) -> bool {
        match self.entries.iter_mut().find(|e| e.path == path) {
            Some(entry) => {
                entry.direction = direction;
                true
            }
            None => false,
        }
    }

    /// Keyed merge of a donor list: our order first, donor's new paths
    /// appended in donor order, donor direction wins on shared paths
    pub fn merge_from(&mut self, donor: &SortList) {
        for entry in donor.entries() {
            self.insert(entry.clone());
        }
    }

    /// Parse a comma separated REST sort string, e.g. `title:asc,id:desc`
    pub fn parse_rest(input: &str, default: SortDirection) -> QueryResult<Self> {
        let mut list = Self::new();
        for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            list.insert(SortEntry::parse_rest(part, default)?);
        }
        Ok(list)
    }

    /// Get all sort entries
    pub fn entries(&self) -> &[SortEntry] {
        &self.entries
    }

    /// Check if any sort is defined
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get number of sort entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<SortEntry> for SortList {
    fn from_iter<I: IntoIterator<Item = SortEntry>>(iter: I) -> Self {
        let mut list = Self::new();
        for entry in iter {
            list.insert(entry);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_entry() {
        let entry = SortEntry::asc("createdAt");
        assert_eq!(entry.path, "createdAt");
        assert_eq!(entry.direction, SortDirection::Asc);
        assert_eq!(SortEntry::desc("createdAt").to_rest(), "createdAt:desc");
    }

    #[test]
    fn test_sort_list_order() {
        let list = SortList::new().then_desc("updatedAt").then_asc("id");

        assert_eq!(list.len(), 2);
        assert_eq!(
            list.entries(),
            &[SortEntry::desc("updatedAt"), SortEntry::asc("id")]
        );
    }

    #[test]
    fn test_insert_existing_keeps_position() {
        let list = SortList::new()
            .then_asc("a")
            .then_asc("b")
            .then_desc("a");

        assert_eq!(
            list.entries(),
            &[SortEntry::desc("a"), SortEntry::asc("b")]
        );
    }

    #[test]
    fn test_merge_from() {
        let mut receiver = SortList::new().then_asc("a").then_asc("b");
        let donor = SortList::new().then_asc("c").then_desc("a");
        receiver.merge_from(&donor);

        assert_eq!(
            receiver.entries(),
            &[SortEntry::desc("a"), SortEntry::asc("b"), SortEntry::asc("c")]
        );
        assert_eq!(donor.len(), 2);
    }

    #[test]
    fn test_parse_rest() {
        let list = SortList::parse_rest("title:desc, id ,name:asc", SortDirection::Asc).unwrap();
        assert_eq!(
            list.entries(),
            &[
                SortEntry::desc("title"),
                SortEntry::asc("id"),
                SortEntry::asc("name")
            ]
        );

        let entry = SortEntry::parse_rest("author.name", SortDirection::Desc).unwrap();
        assert_eq!(entry, SortEntry::desc("author.name"));
    }

    #[test]
    fn test_parse_rest_errors() {
        assert!(matches!(
            SortEntry::parse_rest(":asc", SortDirection::Asc),
            Err(QueryError::InvalidSort { .. })
        ));
        assert!(matches!(
            SortEntry::parse_rest("title:up", SortDirection::Asc),
            Err(QueryError::UnknownSortDirection(_))
        ));
    }

    #[test]
    fn test_set_direction() {
        let mut list = SortList::new().then_asc("a").then_asc("b");
        assert!(list.set_direction("b", SortDirection::Desc));
        assert!(!list.set_direction("z", SortDirection::Desc));
        assert_eq!(list.entries(), &[SortEntry::asc("a"), SortEntry::desc("b")]);
    }
}
