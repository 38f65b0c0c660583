//! Price-level depth aggregation
//!
//! Orders are bucketed by their price rendered to ten fractional digits;
//! the rendered string is the bucket key, so two orders merge only when
//! their formatted prices match exactly. Ask prices are inverted first so
//! both sides quote the base token.
//!
//! Truncation is asymmetric on purpose: bids keep the first `length`
//! levels, asks keep the trailing `length + 1`. Existing consumers depend
//! on the exact slicing, so it is reproduced rather than normalized.

use crate::amounts::AmountCalculator;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::numeric::{self, float_string};
use types::order::OrderState;

/// One aggregated price level: the rendered price and the rational sums of
/// all orders sharing it, rendered to ten decimals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub price: String,
    pub amount: String,
    pub size: String,
}

struct Bucket {
    amount: BigRational,
    size: BigRational,
}

/// Merge one side's order states into sorted, truncated depth levels.
pub async fn calculate_depth(
    calculator: &AmountCalculator,
    states: &[OrderState],
    length: usize,
    is_ask: bool,
    decimals_s: &BigInt,
    decimals_b: &BigInt,
) -> Vec<DepthLevel> {
    if states.is_empty() {
        return Vec::new();
    }

    let mut buckets: HashMap<String, Bucket> = HashMap::new();
    for state in states {
        let Some(price) = state.raw_order.price.clone() else {
            continue;
        };
        let (amount_s, amount_b) = match calculator
            .capped_amounts(state, decimals_s, decimals_b)
            .await
        {
            Ok(amounts) => amounts,
            Err(_) => continue,
        };

        // Asks accumulate sell-side first, bids buy-side first
        let (price, amount, size) = if is_ask {
            (price.recip(), amount_s, amount_b)
        } else {
            (price, amount_b, amount_s)
        };

        let key = float_string(&price, 10);
        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            amount: BigRational::zero(),
            size: BigRational::zero(),
        });
        bucket.amount += amount;
        bucket.size += size;
    }

    let mut depth: Vec<DepthLevel> = buckets
        .into_iter()
        .map(|(price, bucket)| DepthLevel {
            price,
            amount: numeric::format10(&bucket.amount),
            size: numeric::format10(&bucket.size),
        })
        .collect();

    sort_by_price_desc(&mut depth);
    truncate_levels(depth, length, is_ask)
}

/// Descending by the float-parsed price string, both sides.
fn sort_by_price_desc(depth: &mut [DepthLevel]) {
    depth.sort_by(|a, b| {
        let price_a: f64 = a.price.parse().unwrap_or(0.0);
        let price_b: f64 = b.price.parse().unwrap_or(0.0);
        price_b
            .partial_cmp(&price_a)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn truncate_levels(mut depth: Vec<DepthLevel>, length: usize, is_ask: bool) -> Vec<DepthLevel> {
    if depth.len() <= length {
        return depth;
    }
    if is_ask {
        // trailing slice keeps length + 1 entries
        depth.split_off(depth.len() - length - 1)
    } else {
        depth.truncate(length);
        depth
    }
}
