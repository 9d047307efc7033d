use serde::{Deserialize, Serialize};

use crate::types::GroupKey;

/// Aggregate skew metrics for per-key group sizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeySkew {
    /// Values across all groups.
    pub total: usize,
    /// Number of groups.
    pub keys: usize,
    /// Smallest group size.
    pub min: usize,
    /// Largest group size.
    pub max: usize,
    /// Mean group size.
    pub mean: f64,
    /// Fraction of all values in the largest group.
    pub max_share: f64,
    /// Key holding the largest group (lexicographically first on ties).
    pub largest_key: GroupKey,
}

/// Compute skew metrics from `(key, group_size)` pairs.
pub fn key_skew<'a, I>(sizes: I) -> Option<KeySkew>
where
    I: IntoIterator<Item = (&'a str, usize)>,
{
    let mut total = 0usize;
    let mut keys = 0usize;
    let mut min = usize::MAX;
    let mut largest: Option<(&str, usize)> = None;
    for (key, size) in sizes {
        total += size;
        keys += 1;
        min = min.min(size);
        let replace = match largest {
            None => true,
            Some((best_key, best)) => size > best || (size == best && key < best_key),
        };
        if replace {
            largest = Some((key, size));
        }
    }
    let (largest_key, max) = largest?;
    let max_share = if total == 0 {
        0.0
    } else {
        max as f64 / total as f64
    };
    Some(KeySkew {
        total,
        keys,
        min,
        max,
        mean: total as f64 / keys as f64,
        max_share,
        largest_key: largest_key.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_skew_reports_balance() {
        let skew = key_skew([("a", 2), ("b", 2)]).expect("skew");
        assert_eq!(skew.total, 4);
        assert_eq!(skew.keys, 2);
        assert_eq!(skew.min, 2);
        assert_eq!(skew.max, 2);
        assert!((skew.max_share - 0.5).abs() < 1e-6);
        assert_eq!(skew.largest_key, "a");
    }

    #[test]
    fn key_skew_reports_imbalance() {
        let skew = key_skew([("a", 2), ("c", 4), ("b", 2)]).expect("skew");
        assert_eq!(skew.total, 8);
        assert_eq!(skew.max, 4);
        assert!((skew.mean - 8.0 / 3.0).abs() < 1e-6);
        assert_eq!(skew.largest_key, "c");
    }

    #[test]
    fn key_skew_is_none_without_keys() {
        assert!(key_skew(std::iter::empty()).is_none());
    }
}
