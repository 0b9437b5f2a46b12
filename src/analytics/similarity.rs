use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use crate::models::HostPairSimilarity;

/// The amenities offered across all listings of one host.
#[derive(Debug, Clone)]
pub struct HostAmenities {
    /// Identity of the host node; display names are not unique.
    pub key: String,
    pub host: String,
    pub amenities: HashSet<String>,
}

impl HostAmenities {
    pub fn new<I, S>(key: &str, host: &str, amenities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.to_string(),
            host: host.to_string(),
            amenities: amenities.into_iter().map(Into::into).collect(),
        }
    }
}

/// Share of `first`'s amenities that `second` also offers.
///
/// Normalised by `first`'s set size, not the union, so the ratio is
/// asymmetric. Returns `None` when `first` has no amenities.
pub fn amenity_overlap(first: &HostAmenities, second: &HostAmenities) -> Option<f64> {
    if first.amenities.is_empty() {
        return None;
    }
    let shared = first.amenities.intersection(&second.amenities).count();
    Some(shared as f64 / first.amenities.len() as f64)
}

/// A scored pair, ranked by ratio and then by generation order (earlier wins).
#[derive(Debug)]
struct RankedPair {
    ratio: f64,
    seq: usize,
    first: usize,
    second: usize,
}

impl Ord for RankedPair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.ratio
            .total_cmp(&other.ratio)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for RankedPair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankedPair {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedPair {}

/// Scores every ordered pair of distinct hosts and keeps the `limit` highest.
/// Equal ratios keep the order in which the pairs were generated.
///
/// Only `limit` pairs are held at a time; names are cloned for the survivors.
pub fn top_host_pairs(hosts: &[HostAmenities], limit: usize) -> Vec<HostPairSimilarity> {
    if limit == 0 {
        return Vec::new();
    }

    // Min-heap on rank: the weakest kept pair sits on top.
    let mut kept: BinaryHeap<Reverse<RankedPair>> = BinaryHeap::with_capacity(limit + 1);
    let mut seq = 0;

    for (i, first) in hosts.iter().enumerate() {
        for (j, second) in hosts.iter().enumerate() {
            if i == j || first.key == second.key {
                continue;
            }
            let Some(ratio) = amenity_overlap(first, second) else {
                continue;
            };

            let candidate = RankedPair {
                ratio,
                seq,
                first: i,
                second: j,
            };
            seq += 1;

            if kept.len() < limit {
                kept.push(Reverse(candidate));
            } else if kept.peek().is_some_and(|Reverse(weakest)| candidate > *weakest) {
                kept.pop();
                kept.push(Reverse(candidate));
            }
        }
    }

    // Ascending on `Reverse` is descending on rank.
    kept.into_sorted_vec()
        .into_iter()
        .map(|Reverse(pair)| HostPairSimilarity {
            host1: hosts[pair.first].host.clone(),
            host2: hosts[pair.second].host.clone(),
            ratio: pair.ratio,
        })
        .collect()
}
