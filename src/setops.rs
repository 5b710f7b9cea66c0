//! Set algebra over location lists, keyed on normalized address text.
//!
//! Binary operations compare files by address identity (lowercased, trimmed)
//! but keep full rows in the result; exact duplicate rows are collapsed.

use crate::records::{normalize_address, LocationRecord};
use std::collections::HashSet;

fn address_keys(records: &[LocationRecord]) -> HashSet<String> {
    records.iter().map(LocationRecord::address_key).collect()
}

/// Collapse exact duplicate rows, keeping first occurrences in order.
pub fn dedup_rows(records: impl IntoIterator<Item = LocationRecord>) -> Vec<LocationRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.row_key()))
        .collect()
}

/// All rows from both lists.
pub fn union(a: &[LocationRecord], b: &[LocationRecord]) -> Vec<LocationRecord> {
    dedup_rows(a.iter().chain(b.iter()).cloned())
}

/// Rows from both lists whose address appears in both.
pub fn intersect(a: &[LocationRecord], b: &[LocationRecord]) -> Vec<LocationRecord> {
    let common: HashSet<String> = address_keys(a)
        .intersection(&address_keys(b))
        .cloned()
        .collect();
    dedup_rows(
        a.iter()
            .chain(b.iter())
            .filter(|record| common.contains(&record.address_key()))
            .cloned(),
    )
}

/// Rows from `a` whose address does not appear in `b`.
pub fn difference(a: &[LocationRecord], b: &[LocationRecord]) -> Vec<LocationRecord> {
    let excluded = address_keys(b);
    dedup_rows(
        a.iter()
            .filter(|record| !excluded.contains(&record.address_key()))
            .cloned(),
    )
}

/// First occurrence of each address, in input order.
pub fn unique(records: &[LocationRecord]) -> Vec<LocationRecord> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.address_key()))
        .cloned()
        .collect()
}

/// Distinct rows ordered by case-insensitive address.
pub fn sort_by_address(records: &[LocationRecord]) -> Vec<LocationRecord> {
    let mut sorted = dedup_rows(records.iter().cloned());
    sorted.sort_by_key(|record| normalize_address(&record.address));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(address: &str, lat: f64, lon: f64) -> LocationRecord {
        LocationRecord {
            address: address.into(),
            lat,
            lon,
        }
    }

    fn keys(records: &[LocationRecord]) -> HashSet<String> {
        records.iter().map(LocationRecord::address_key).collect()
    }

    #[test]
    fn test_union_is_idempotent() {
        let a = vec![rec("1 Alpha St", 1.0, 2.0), rec("2 Beta Ave", 3.0, 4.0)];
        assert_eq!(union(&a, &a), a);
    }

    #[test]
    fn test_union_and_intersect_commute_on_keys() {
        let a = vec![rec("1 Alpha St", 1.0, 2.0), rec("2 Beta Ave", 3.0, 4.0)];
        let b = vec![rec("2 beta ave", 3.5, 4.5), rec("3 Gamma Rd", 5.0, 6.0)];
        assert_eq!(keys(&union(&a, &b)), keys(&union(&b, &a)));
        assert_eq!(keys(&intersect(&a, &b)), keys(&intersect(&b, &a)));
    }

    #[test]
    fn test_intersect_keeps_rows_from_both_sides() {
        let a = vec![rec("1 Alpha St", 1.0, 2.0), rec("2 Beta Ave", 3.0, 4.0)];
        let b = vec![rec("2 BETA AVE ", 3.5, 4.5)];
        let result = intersect(&a, &b);
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|r| r.address_key() == "2 beta ave"));
    }

    #[test]
    fn test_difference_removes_matching_addresses() {
        let a = vec![rec("1 Alpha St", 1.0, 2.0), rec("2 Beta Ave", 3.0, 4.0)];
        let b = vec![rec("2 beta ave", 9.0, 9.0)];
        assert_eq!(difference(&a, &b), vec![rec("1 Alpha St", 1.0, 2.0)]);
        assert!(difference(&a, &a).is_empty());
    }

    #[test]
    fn test_unique_keeps_first_occurrence() {
        let a = vec![
            rec("1 Alpha St", 1.0, 2.0),
            rec(" 1 ALPHA ST", 9.0, 9.0),
            rec("2 Beta Ave", 3.0, 4.0),
        ];
        assert_eq!(
            unique(&a),
            vec![rec("1 Alpha St", 1.0, 2.0), rec("2 Beta Ave", 3.0, 4.0)]
        );
    }

    #[test]
    fn test_sort_is_case_insensitive() {
        let a = vec![
            rec("b road", 0.0, 0.0),
            rec("A street", 0.0, 0.0),
            rec("c lane", 0.0, 0.0),
        ];
        let sorted = sort_by_address(&a);
        let order: Vec<&str> = sorted.iter().map(|r| r.address.as_str()).collect();
        assert_eq!(order, vec!["A street", "b road", "c lane"]);
    }

    #[test]
    fn test_sort_collapses_exact_duplicate_rows() {
        let a = vec![
            rec("1 Alpha St", 1.0, 2.0),
            rec("1 Alpha St", 1.0, 2.0),
            rec("2 Beta Ave", 3.0, 4.0),
        ];
        let sorted = sort_by_address(&a);
        assert_eq!(
            sorted,
            vec![rec("1 Alpha St", 1.0, 2.0), rec("2 Beta Ave", 3.0, 4.0)]
        );
    }

    #[test]
    fn test_dedup_collapses_exact_rows_only() {
        let a = vec![
            rec("1 Alpha St", 1.0, 2.0),
            rec("1 Alpha St", 1.0, 2.0),
            rec("1 Alpha St", 1.5, 2.0),
        ];
        assert_eq!(dedup_rows(a).len(), 2);
    }
}
