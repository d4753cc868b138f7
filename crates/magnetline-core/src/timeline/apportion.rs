//! Largest-remainder apportionment of whole minutes.
//!
//! Splits a number of minutes across weighted recipients so that the
//! integer shares sum to exactly the input. The fractional part of each
//! share is kept as an exact numerator over the total weight, so no
//! floating point is involved.

use serde::{Deserialize, Serialize};

/// One recipient's share of an apportioned total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    /// Position of the recipient in the input weights
    pub index: usize,
    /// Whole minutes assigned, including any leftover minute
    pub whole: i64,
    /// Fractional part of the raw share as a numerator over the total weight
    pub remainder: i64,
}

/// Distribute `total` minutes over `weights` by largest remainder.
///
/// Every recipient first gets the floor of its proportional share; the
/// minutes lost to flooring then go one at a time to the largest fractional
/// remainders, ties broken by input order. Negative weights count as zero,
/// and if every weight is zero the split is even. A negative total is
/// treated as zero.
pub fn apportion(total: i64, weights: &[i64]) -> Vec<Share> {
    if weights.is_empty() {
        return Vec::new();
    }
    let total = i128::from(total.max(0));

    let mut weights: Vec<i128> = weights.iter().map(|&w| i128::from(w.max(0))).collect();
    let mut weight_sum: i128 = weights.iter().sum();
    if weight_sum == 0 {
        weights.iter_mut().for_each(|w| *w = 1);
        weight_sum = weights.len() as i128;
    }

    let mut shares: Vec<Share> = weights
        .iter()
        .enumerate()
        .map(|(index, &weight)| {
            let raw = total * weight;
            Share {
                index,
                whole: (raw / weight_sum) as i64,
                remainder: (raw % weight_sum) as i64,
            }
        })
        .collect();

    let assigned: i64 = shares.iter().map(|s| s.whole).sum();
    let leftover = (total as i64 - assigned) as usize;

    let mut order: Vec<usize> = (0..shares.len()).collect();
    // Stable sort keeps input order among equal remainders.
    order.sort_by(|&a, &b| shares[b].remainder.cmp(&shares[a].remainder));
    for &index in order.iter().take(leftover) {
        shares[index].whole += 1;
    }

    shares
}
