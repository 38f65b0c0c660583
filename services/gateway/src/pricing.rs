//! Limit-price derivation
//!
//! An order's price is `(amountS / amountB) * (decimalsB / decimalsS)`, an
//! exact rational computed once at admission and carried on the order from
//! then on. It is never reconstructed from floating point.

use crate::error::PricingError;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use types::order::Order;
use types::provider::TokenRegistry;

/// Exact limit price from raw amounts and the tokens' scale factors.
pub fn price_for(
    amount_s: &BigInt,
    amount_b: &BigInt,
    decimals_s: &BigInt,
    decimals_b: &BigInt,
) -> Result<BigRational, PricingError> {
    if !amount_s.is_positive() || !amount_b.is_positive() {
        return Err(PricingError::InvalidAmount);
    }
    if !decimals_s.is_positive() || !decimals_b.is_positive() {
        return Err(PricingError::InvalidDecimals);
    }

    Ok(BigRational::new(amount_s.clone(), amount_b.clone())
        * BigRational::new(decimals_b.clone(), decimals_s.clone()))
}

/// Resolve both token scale factors and store the computed price on the
/// order. Unknown tokens count as missing decimals.
pub fn generate_price(
    order: &mut Order,
    registry: &dyn TokenRegistry,
) -> Result<(), PricingError> {
    let token_s = registry
        .token_by_address(&order.token_s)
        .ok_or(PricingError::InvalidDecimals)?;
    let token_b = registry
        .token_by_address(&order.token_b)
        .ok_or(PricingError::InvalidDecimals)?;

    order.price = Some(price_for(
        &order.amount_s,
        &order.amount_b,
        &token_s.decimals,
        &token_b.decimals,
    )?);
    Ok(())
}
