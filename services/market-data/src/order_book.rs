//! Flattened per-order book
//!
//! One row per order, with no bucketing, carrying the per-order fee and split
//! detail alongside the capped amounts. Rows are sorted and truncated the
//! same way as depth levels, but the rendered numbers go through the
//! 8-decimal double round-trip instead of 10-decimal strings.

use crate::amounts::AmountCalculator;
use num_bigint::BigInt;
use num_rational::BigRational;
use serde::{Deserialize, Serialize};
use types::numeric::round8;
use types::order::OrderState;

/// One displayable order-book row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRow {
    pub price: f64,
    pub size: f64,
    pub amount: f64,
    pub order_hash: String,
    pub lrc_fee: f64,
    pub split_s: f64,
    pub split_b: f64,
    pub valid_until: i64,
}

/// Render one side's order states into sorted, truncated book rows.
pub async fn generate_book(
    calculator: &AmountCalculator,
    states: &[OrderState],
    is_ask: bool,
    decimals_s: &BigInt,
    decimals_b: &BigInt,
    fee_decimals: &BigInt,
    length: usize,
) -> Vec<BookRow> {
    let mut rows = Vec::new();

    for state in states {
        let order = &state.raw_order;
        let Some(price) = order.price.clone() else {
            continue;
        };
        let (amount_s, amount_b) = match calculator
            .capped_amounts(state, decimals_s, decimals_b)
            .await
        {
            Ok(amounts) => amounts,
            Err(_) => continue,
        };

        let (price, amount, size) = if is_ask {
            (price.recip(), amount_s, amount_b)
        } else {
            (price, amount_b, amount_s)
        };

        rows.push(BookRow {
            price: round8(&price),
            size: round8(&size),
            amount: round8(&amount),
            order_hash: order.hash.to_string(),
            lrc_fee: round8(&BigRational::new(order.lrc_fee.clone(), fee_decimals.clone())),
            split_s: round8(&BigRational::new(
                state.split_amount_s.clone(),
                decimals_s.clone(),
            )),
            split_b: round8(&BigRational::new(
                state.split_amount_b.clone(),
                decimals_b.clone(),
            )),
            valid_until: order.valid_until,
        });
    }

    sort_by_price_desc(&mut rows);
    truncate_rows(rows, length, is_ask)
}

fn sort_by_price_desc(rows: &mut [BookRow]) {
    rows.sort_by(|a, b| {
        b.price
            .partial_cmp(&a.price)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn truncate_rows(mut rows: Vec<BookRow>, length: usize, is_ask: bool) -> Vec<BookRow> {
    if rows.len() <= length {
        return rows;
    }
    if is_ask {
        // same trailing slice as depth: length + 1 rows survive
        rows.split_off(rows.len() - length - 1)
    } else {
        rows.truncate(length);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(price: f64) -> BookRow {
        BookRow {
            price,
            size: 1.0,
            amount: 1.0,
            order_hash: "0x00".to_string(),
            lrc_fee: 0.0,
            split_s: 0.0,
            split_b: 0.0,
            valid_until: 0,
        }
    }

    #[test]
    fn test_rows_sorted_descending() {
        let mut rows = vec![row(1.0), row(9.0), row(4.5)];
        sort_by_price_desc(&mut rows);
        let prices: Vec<f64> = rows.iter().map(|r| r.price).collect();
        assert_eq!(prices, vec![9.0, 4.5, 1.0]);
    }

    #[test]
    fn test_row_truncation_mirrors_depth() {
        let rows: Vec<BookRow> = (1..=6).map(|p| row(p as f64)).collect();
        assert_eq!(truncate_rows(rows.clone(), 4, true).len(), 5);
        assert_eq!(truncate_rows(rows, 4, false).len(), 4);
    }
}
