//! Per-order available-amount computation
//!
//! Shared by depth aggregation and the flattened book: remaining quantities
//! are scaled to human units, capped by the owner's live balance and
//! allowance, gated against dust, and finally reconciled so both sides
//! still express the exchange rate the order was signed with.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Zero};
use std::sync::Arc;
use types::ids::Address;
use types::order::OrderState;
use types::provider::AccountStateProvider;

/// Why an order contributes nothing to the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// Nothing left to trade on one of the sides.
    ZeroRemaining,
    /// The capped amount fell below the dust threshold.
    Dust,
    /// Balance/allowance lookup failed; the order is hidden rather than
    /// shown with an unverifiable size.
    AccountLookupFailed,
}

pub struct AmountCalculator {
    accounts: Arc<dyn AccountStateProvider>,
    dust_threshold: BigRational,
}

impl AmountCalculator {
    pub fn new(accounts: Arc<dyn AccountStateProvider>) -> Self {
        // 1e-8 of a token is not worth displaying
        Self {
            accounts,
            dust_threshold: BigRational::new(BigInt::one(), BigInt::from(100_000_000)),
        }
    }

    pub fn with_dust_threshold(mut self, dust_threshold: BigRational) -> Self {
        self.dust_threshold = dust_threshold;
        self
    }

    /// Sell/buy amounts this order can still trade, in human units.
    pub async fn capped_amounts(
        &self,
        state: &OrderState,
        decimals_s: &BigInt,
        decimals_b: &BigInt,
    ) -> Result<(BigRational, BigRational), Skip> {
        let (remained_s, remained_b) = state.remained_amount();
        let amount_s = remained_s / BigRational::from(decimals_s.clone());
        let amount_b = remained_b / BigRational::from(decimals_b.clone());

        if amount_s.is_zero() {
            tracing::debug!(order_hash = %state.raw_order.hash, "amount s is zero, skipped");
            return Err(Skip::ZeroRemaining);
        }
        if amount_b.is_zero() {
            tracing::debug!(order_hash = %state.raw_order.hash, "amount b is zero, skipped");
            return Err(Skip::ZeroRemaining);
        }

        let order = &state.raw_order;
        let mut min_amount_s = self
            .available_amount(
                amount_s,
                &order.owner,
                &order.token_s,
                &order.delegate_address,
                decimals_s,
            )
            .await?;
        let mut min_amount_b = amount_b;

        // Whichever side is capped, the other follows the original ratio.
        let sell_price = BigRational::new(order.amount_s.clone(), order.amount_b.clone());
        let buy_price = BigRational::new(order.amount_b.clone(), order.amount_s.clone());
        if order.buy_no_more_than_amount_b {
            let limited_s = &min_amount_b * &sell_price;
            if limited_s < min_amount_s {
                min_amount_s = limited_s;
            }
            min_amount_b = &min_amount_s * &buy_price;
        } else {
            let limited_b = &min_amount_s * &buy_price;
            if limited_b < min_amount_b {
                min_amount_b = limited_b;
            }
            min_amount_s = &min_amount_b * &sell_price;
        }

        Ok((min_amount_s, min_amount_b))
    }

    /// Cap a display amount by live balance and allowance; amounts below
    /// the dust threshold are dropped entirely.
    async fn available_amount(
        &self,
        amount: BigRational,
        owner: &Address,
        token: &Address,
        spender: &Address,
        decimals: &BigInt,
    ) -> Result<BigRational, Skip> {
        let (balance, allowance) = self
            .accounts
            .balance_and_allowance(owner, token, spender)
            .await
            .map_err(|_| Skip::AccountLookupFailed)?;

        let mut amount = amount;
        let balance = BigRational::new(balance, decimals.clone());
        let allowance = BigRational::new(allowance, decimals.clone());
        if amount > balance {
            amount = balance;
        }
        if amount > allowance {
            amount = allowance;
        }

        if amount < self.dust_threshold {
            return Err(Skip::Dust);
        }
        Ok(amount)
    }
}
