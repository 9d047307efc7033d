//! Deterministic shard partitioning and key grouping.
//!
//! Sharding splits a source's index space into disjoint, contiguous ranges so
//! map workers never share state. Grouping is the shuffle barrier between map
//! and reduce: every value for one key lands in one bucket, buckets are ordered
//! lexicographically by `(namespace, key)`, and values inside a bucket keep the
//! order in which they were emitted.

use std::ops::Range;

use indexmap::IndexMap;

use crate::types::{GroupKey, Namespace};

/// Identity of one reduce invocation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShuffleKey {
    /// Key space the group belongs to.
    pub namespace: Namespace,
    /// Key within the namespace.
    pub key: GroupKey,
}

/// Split `0..total` into contiguous ranges of at most `shard_size` indices.
///
/// Edge cases:
/// - `total == 0` => no shards
/// - `shard_size == 0` => treated as `1`
pub fn shard_ranges(total: usize, shard_size: usize) -> Vec<Range<usize>> {
    let shard_size = shard_size.max(1);
    let mut ranges = Vec::with_capacity(total.div_ceil(shard_size));
    let mut start = 0usize;
    while start < total {
        let end = (start + shard_size).min(total);
        ranges.push(start..end);
        start = end;
    }
    ranges
}

/// Group `(namespace, key, value)` triples into key-ordered buckets.
pub fn group_by_key<V, I>(emissions: I) -> IndexMap<ShuffleKey, Vec<V>>
where
    I: IntoIterator<Item = (Namespace, GroupKey, V)>,
{
    let mut groups: IndexMap<ShuffleKey, Vec<V>> = IndexMap::new();
    for (namespace, key, value) in emissions {
        groups
            .entry(ShuffleKey { namespace, key })
            .or_default()
            .push(value);
    }
    groups.sort_unstable_keys();
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_ranges_cover_domain_without_overlap() {
        let ranges = shard_ranges(10, 4);
        assert_eq!(ranges, vec![0..4, 4..8, 8..10]);
        assert!(shard_ranges(0, 4).is_empty());
        assert_eq!(shard_ranges(3, 0), vec![0..1, 1..2, 2..3]);
        assert_eq!(shard_ranges(3, 100), vec![0..3]);
    }

    #[test]
    fn group_by_key_orders_keys_and_preserves_value_order() {
        let groups = group_by_key(vec![
            ("rule", "b".to_string(), 1),
            ("handler", "b".to_string(), 2),
            ("rule", "a".to_string(), 3),
            ("rule", "b".to_string(), 4),
        ]);
        let flattened: Vec<(Namespace, &str, Vec<i32>)> = groups
            .iter()
            .map(|(shuffle, values)| (shuffle.namespace, shuffle.key.as_str(), values.clone()))
            .collect();
        assert_eq!(
            flattened,
            vec![
                ("handler", "b", vec![2]),
                ("rule", "a", vec![3]),
                ("rule", "b", vec![1, 4]),
            ]
        );
    }

    #[test]
    fn group_by_key_is_independent_of_arrival_order_across_keys() {
        let forward = group_by_key(vec![("n", "x".to_string(), 1), ("n", "y".to_string(), 2)]);
        let reverse = group_by_key(vec![("n", "y".to_string(), 2), ("n", "x".to_string(), 1)]);
        assert_eq!(
            forward.into_iter().collect::<Vec<_>>(),
            reverse.into_iter().collect::<Vec<_>>()
        );
    }
}
