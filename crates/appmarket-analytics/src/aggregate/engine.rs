//! Generic group-by-then-reduce engine.
//!
//! All grouped queries share this one engine: a stream of (key, value)
//! pairs is folded into per-key accumulators, keeping keys in first-seen
//! order. Descending sorts over the result use a stable sort, so ties keep
//! their first-seen (input) order.

use std::collections::HashMap;
use std::hash::Hash;

/// Fold a stream of (key, value) pairs into one accumulator per key.
///
/// Keys come out in first-seen order.
pub(crate) fn group_fold<K, V, A>(
    pairs: impl IntoIterator<Item = (K, V)>,
    mut init: impl FnMut() -> A,
    mut fold: impl FnMut(&mut A, V),
) -> Vec<(K, A)>
where
    K: Eq + Hash + Clone,
{
    let mut groups: Vec<(K, A)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();

    for (key, value) in pairs {
        let slot = match index.get(&key) {
            Some(&i) => i,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, init()));
                groups.len() - 1
            }
        };
        fold(&mut groups[slot].1, value);
    }

    groups
}

/// Count occurrences per key, in first-seen order.
pub(crate) fn group_count<K>(keys: impl IntoIterator<Item = K>) -> Vec<(K, u32)>
where
    K: Eq + Hash + Clone,
{
    group_fold(
        keys.into_iter().map(|k| (k, ())),
        || 0u32,
        |acc, ()| *acc += 1,
    )
}

/// Sum values per key, in first-seen order.
pub(crate) fn group_sum<K>(pairs: impl IntoIterator<Item = (K, i64)>) -> Vec<(K, i64)>
where
    K: Eq + Hash + Clone,
{
    group_fold(pairs, || 0i64, |acc, v| *acc += v)
}

/// Sort groups descending by their aggregate, ties in first-seen order.
pub(crate) fn sort_desc<K, A: Ord + Copy>(mut groups: Vec<(K, A)>) -> Vec<(K, A)> {
    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups
}

/// Inner-join two keyed aggregates: only keys present on both sides survive,
/// in the left side's order.
pub(crate) fn inner_join<K, A, B>(left: Vec<(K, A)>, right: Vec<(K, B)>) -> Vec<(K, A, B)>
where
    K: Eq + Hash + Clone,
    B: Copy,
{
    let lookup: HashMap<K, B> = right.into_iter().collect();
    left.into_iter()
        .filter_map(|(key, a)| lookup.get(&key).map(|b| (key.clone(), a, *b)))
        .collect()
}
