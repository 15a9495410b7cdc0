//! Merge Engine
//!
//! Joins the sections of a donor query tree into a receiver. The donor is
//! only read, so one donor can be joined into any number of receivers.

use cq_core::Pagination;

use crate::fields::FieldSelection;
use crate::filters::{FilterNode, LogicalGroup};
use crate::populate::Population;
use crate::sorts::SortList;

/// Join donor filters into the receiver root.
///
/// Without `merge_root_logical` the donor root becomes one child of the
/// receiver root (inlined when it is a single, non-negated child). With it,
/// the donor's combinator and negation become the root, holding the donor's
/// children followed by the receiver's.
///
/// Returns how many children were placed in front of the receiver's
/// existing root children.
pub fn join_filters(receiver: &mut LogicalGroup, donor: &LogicalGroup, merge_root_logical: bool) -> usize {
    if merge_root_logical {
        let existing = std::mem::take(&mut receiver.children);
        receiver.combinator = donor.combinator;
        receiver.negated = donor.negated;
        receiver.children = donor.children.clone();
        receiver.children.extend(existing);
        return donor.children.len();
    }

    if donor.is_empty() {
        return 0;
    }

    if donor.len() == 1 && !donor.negated {
        receiver.push(donor.children[0].clone());
    } else {
        receiver.push(FilterNode::Group(donor.clone()));
    }
    0
}

pub fn join_fields(receiver: &mut FieldSelection, donor: &FieldSelection) {
    receiver.merge_from(donor);
}

pub fn join_sort(receiver: &mut SortList, donor: &SortList) {
    receiver.merge_from(donor);
}

pub fn join_populate(receiver: &mut Population, donor: &Population) {
    receiver.merge_from(donor);
}

pub fn join_pagination(receiver: &mut Pagination, donor: &Pagination) {
    receiver.merge_from(donor);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{AttributeLeaf, Operator};
    use crate::populate::PopulateValue;
    use crate::query::QueryTree;
    use crate::sorts::SortEntry;
    use serde_json::json;

    fn leaf(path: &str, value: i64) -> FilterNode {
        FilterNode::Leaf(AttributeLeaf::new(path, Operator::Eq, value))
    }

    #[test]
    fn test_join_filters_nests_donor_group() {
        let mut receiver = LogicalGroup::and().with(leaf("a", 1));
        let donor = LogicalGroup::or().with(leaf("b", 2)).with(leaf("c", 3));

        assert_eq!(join_filters(&mut receiver, &donor, false), 0);
        assert_eq!(
            receiver.to_value(),
            Some(json!({"$and": [
                {"a": {"$eq": 1}},
                {"$or": [{"b": {"$eq": 2}}, {"c": {"$eq": 3}}]}
            ]}))
        );
    }

    #[test]
    fn test_join_filters_inlines_single_child() {
        let mut receiver = LogicalGroup::and().with(leaf("a", 1));
        let donor = LogicalGroup::or().with(leaf("b", 2));

        join_filters(&mut receiver, &donor, false);
        assert_eq!(receiver.children, vec![leaf("a", 1), leaf("b", 2)]);
    }

    #[test]
    fn test_join_filters_keeps_negated_single_child_wrapped() {
        let mut receiver = LogicalGroup::and();
        let donor = LogicalGroup::and().with(leaf("b", 2)).negate();

        join_filters(&mut receiver, &donor, false);
        assert_eq!(
            receiver.to_value(),
            Some(json!({"$and": [{"$not": {"$and": [{"b": {"$eq": 2}}]}}]}))
        );
    }

    #[test]
    fn test_join_filters_empty_donor() {
        let mut receiver = LogicalGroup::or().with(leaf("a", 1));
        join_filters(&mut receiver, &LogicalGroup::and(), false);
        assert_eq!(receiver, LogicalGroup::or().with(leaf("a", 1)));
    }

    #[test]
    fn test_merge_root_logical_takes_donor_shape() {
        let mut receiver = LogicalGroup::or().with(leaf("a", 1));
        let donor = LogicalGroup::and().with(leaf("b", 2)).negate();

        assert_eq!(join_filters(&mut receiver, &donor, true), 1);
        assert_eq!(
            receiver.to_value(),
            Some(json!({"$not": {"$and": [{"b": {"$eq": 2}}, {"a": {"$eq": 1}}]}}))
        );
    }

    #[test]
    fn test_merge_root_logical_is_asymmetric() {
        let a = LogicalGroup::or().with(leaf("a", 1));
        let b = LogicalGroup::and().with(leaf("b", 2)).negate();

        let mut a_into_b = b.clone();
        join_filters(&mut a_into_b, &a, true);
        let mut b_into_a = a.clone();
        join_filters(&mut b_into_a, &b, true);

        assert_ne!(a_into_b, b_into_a);
        assert_eq!(
            a_into_b.to_value(),
            Some(json!({"$or": [{"a": {"$eq": 1}}, {"b": {"$eq": 2}}]}))
        );
    }

    #[test]
    fn test_section_joins_leave_donor_untouched() {
        let mut receiver = QueryTree::new()
            .with_field("a")
            .with_sort(SortEntry::asc("x"))
            .with_pagination(Pagination::paged(1, 10));
        let donor = QueryTree::new()
            .with_filter(leaf("b", 2))
            .with_field("b")
            .with_field("a")
            .with_sort(SortEntry::desc("x"))
            .with_sort(SortEntry::asc("y"))
            .with_populate("author", PopulateValue::True)
            .with_pagination(Pagination::Page {
                page: Some(3),
                page_size: None,
            });
        let snapshot = donor.clone();

        join_filters(&mut receiver.filters, &donor.filters, false);
        join_fields(&mut receiver.fields, &donor.fields);
        join_sort(&mut receiver.sort, &donor.sort);
        join_populate(&mut receiver.populate, &donor.populate);
        join_pagination(&mut receiver.pagination, &donor.pagination);

        assert_eq!(donor, snapshot);
        assert_eq!(receiver.fields.names(), &["a".to_string(), "b".to_string()]);
        assert_eq!(
            receiver.sort.entries(),
            &[SortEntry::desc("x"), SortEntry::asc("y")]
        );
        assert_eq!(receiver.pagination, Pagination::paged(3, 10));
        assert!(receiver.populate.get("author").is_some());
        assert_eq!(receiver.filters.children, vec![leaf("b", 2)]);
    }

    mod properties {
        use super::*;
        use cq_core::SortDirection;
        use proptest::prelude::*;

        const KEYS: [&str; 4] = ["a", "b", "c", "d"];

        fn arb_key() -> impl Strategy<Value = String> {
            prop_oneof![
                Just(KEYS[0].to_string()),
                Just(KEYS[1].to_string()),
                Just(KEYS[2].to_string()),
                Just(KEYS[3].to_string()),
            ]
        }

        fn arb_fields() -> impl Strategy<Value = FieldSelection> {
            prop::collection::vec(arb_key(), 0..6).prop_map(|names| names.into_iter().collect())
        }

        fn arb_sort() -> impl Strategy<Value = SortList> {
            let direction = prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)];
            prop::collection::vec((arb_key(), direction), 0..6).prop_map(|entries| {
                entries
                    .into_iter()
                    .map(|(path, direction)| SortEntry::new(path, direction))
                    .collect()
            })
        }

        fn arb_population() -> impl Strategy<Value = Population> {
            prop_oneof![
                4 => prop::collection::vec(arb_key(), 0..6).prop_map(|keys| {
                    let mut population = Population::default();
                    for key in keys {
                        population.insert(key, PopulateValue::True);
                    }
                    population
                }),
                1 => Just(Population::All),
            ]
        }

        proptest! {
            #[test]
            fn keyed_joins_are_idempotent(
                fields in arb_fields(),
                donor_fields in arb_fields(),
                sort in arb_sort(),
                donor_sort in arb_sort(),
                population in arb_population(),
                donor_population in arb_population(),
            ) {
                let mut once = (fields.clone(), sort.clone(), population.clone());
                join_fields(&mut once.0, &donor_fields);
                join_sort(&mut once.1, &donor_sort);
                join_populate(&mut once.2, &donor_population);

                let mut twice = once.clone();
                join_fields(&mut twice.0, &donor_fields);
                join_sort(&mut twice.1, &donor_sort);
                join_populate(&mut twice.2, &donor_population);

                prop_assert_eq!(once, twice);
            }

            #[test]
            fn repeated_key_keeps_first_position_and_last_value(
                prefix in prop::collection::vec(arb_key(), 0..4),
                directions in prop::collection::vec(any::<bool>(), 1..6),
            ) {
                let mut sort: SortList = prefix
                    .iter()
                    .map(|path| SortEntry::asc(path.clone()))
                    .collect();
                let mut population = Population::default();
                for key in &prefix {
                    population.insert(key.clone(), PopulateValue::True);
                }

                let key = "repeated";
                for (index, desc) in directions.iter().enumerate() {
                    let direction = if *desc { SortDirection::Desc } else { SortDirection::Asc };
                    sort.insert(SortEntry::new(key, direction));
                    let value = QueryTree::new().with_field(format!("v{}", index));
                    population.insert(key, PopulateValue::nested(value));
                }

                let last = directions.len() - 1;
                let expected = if directions[last] { SortDirection::Desc } else { SortDirection::Asc };
                let position = sort.entries().iter().position(|entry| entry.path == key);
                prop_assert_eq!(position, Some(sort.len() - 1));
                prop_assert_eq!(sort.entries().iter().filter(|entry| entry.path == key).count(), 1);
                prop_assert_eq!(sort.entries()[sort.len() - 1].direction, expected);

                let keys: Vec<_> = population.entries().iter().map(|entry| entry.key.as_str()).collect();
                prop_assert_eq!(keys.iter().filter(|k| **k == key).count(), 1);
                prop_assert_eq!(keys.last().copied(), Some(key));
                let expected_value = PopulateValue::nested(QueryTree::new().with_field(format!("v{}", last)));
                prop_assert_eq!(population.get(key), Some(&expected_value));
            }

            #[test]
            fn keyed_joins_never_duplicate_keys(
                fields in arb_fields(),
                donor_fields in arb_fields(),
                sort in arb_sort(),
                donor_sort in arb_sort(),
            ) {
                let mut fields = fields;
                join_fields(&mut fields, &donor_fields);
                let mut sort = sort;
                join_sort(&mut sort, &donor_sort);

                prop_assert_eq!(fields.name_set().len(), fields.len());
                let paths: std::collections::BTreeSet<_> =
                    sort.entries().iter().map(|entry| entry.path.as_str()).collect();
                prop_assert_eq!(paths.len(), sort.len());
                for name in donor_fields.names() {
                    prop_assert!(fields.has_field(name));
                }
                for entry in donor_sort.entries() {
                    prop_assert!(sort.entries().contains(entry));
                }
            }
        }
    }
}
