use crate::types::{AggregatedGroup, CanonicalRecord};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::debug;

/// Group records by the key `key_of` selects, summing values per group.
///
/// Groups come back in first-seen order. Keys compare by exact string
/// equality (no trimming, case-sensitive); an empty key is folded into the
/// `sentinel` group. Every record lands in exactly one group.
pub fn group_by<F>(records: &[CanonicalRecord], key_of: F, sentinel: &str) -> Vec<AggregatedGroup>
where
    F: Fn(&CanonicalRecord) -> &str,
{
    let mut groups: IndexMap<String, AggregatedGroup> = IndexMap::new();
    for record in records {
        let key = match key_of(record) {
            "" => sentinel,
            k => k,
        };
        groups
            .entry(key.to_string())
            .or_insert_with(|| AggregatedGroup::new(key))
            .push(record.clone());
    }
    debug!(records = records.len(), groups = groups.len(), "aggregated records");
    groups.into_values().collect()
}

/// Group by each record's own key.
pub fn group_by_key(records: &[CanonicalRecord], sentinel: &str) -> Vec<AggregatedGroup> {
    group_by(records, |r| r.key.as_str(), sentinel)
}

/// Group by a named attribute; records without it join the sentinel group.
pub fn group_by_attribute(
    records: &[CanonicalRecord],
    attribute: &str,
    sentinel: &str,
) -> Vec<AggregatedGroup> {
    group_by(records, |r| r.attribute(attribute).unwrap_or(""), sentinel)
}

/// Number of distinct values an attribute takes across `records`.
/// Missing values count once, as the empty string.
pub fn distinct_count(records: &[CanonicalRecord], attribute: &str) -> usize {
    let seen: HashSet<&str> = records
        .iter()
        .map(|r| r.attribute(attribute).unwrap_or(""))
        .collect();
    seen.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rec(key: &str, value: f64) -> CanonicalRecord {
        CanonicalRecord::new(key, value)
    }

    #[test]
    fn groups_keep_first_seen_order_and_sum_values() {
        let records = vec![rec("b", 1.0), rec("a", 2.0), rec("b", 3.0)];
        let groups = group_by_key(&records, "Unknown");
        let summary: Vec<(&str, f64, usize)> = groups
            .iter()
            .map(|g| (g.key.as_str(), g.total, g.member_count))
            .collect();
        assert_eq!(summary, vec![("b", 4.0, 2), ("a", 2.0, 1)]);
    }

    #[test]
    fn keys_are_case_sensitive_and_untrimmed() {
        let records = vec![rec("Remote", 1.0), rec("remote", 1.0), rec("Remote ", 1.0)];
        assert_eq!(group_by_key(&records, "Unknown").len(), 3);
    }

    #[test]
    fn empty_keys_fold_into_sentinel() {
        let records = vec![rec("", 2.0), rec("x", 1.0), rec("", 5.0)];
        let groups = group_by_key(&records, "Other");
        assert_eq!(groups[0].key, "Other");
        assert_eq!(groups[0].total, 7.0);
    }

    #[test]
    fn attribute_grouping_uses_sentinel_for_missing() {
        let records = vec![
            rec("a", 1.0).with_attribute("city", "Austin"),
            rec("b", 1.0),
            rec("c", 1.0).with_attribute("city", "Austin"),
        ];
        let groups = group_by_attribute(&records, "city", "Unknown");
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "Austin");
        assert_eq!(groups[0].member_count, 2);
        assert_eq!(groups[1].key, "Unknown");
    }

    #[test]
    fn distinct_count_counts_unique_attribute_values() {
        let records = vec![
            rec("a", 1.0).with_attribute("employer_name", "Acme"),
            rec("b", 1.0).with_attribute("employer_name", "Globex"),
            rec("c", 1.0).with_attribute("employer_name", "Acme"),
        ];
        assert_eq!(distinct_count(&records, "employer_name"), 2);
        assert_eq!(distinct_count(&[], "employer_name"), 0);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_key(&[], "Unknown").is_empty());
    }
}
