//! Proof-of-work admission stage
//!
//! A cheap spam deterrent evaluated before any stage that touches the
//! network: SHA-256 over the signature scalars and a little-endian nonce,
//! read as a big-endian integer and compared against the configured
//! difficulty.

use super::Filter;
use crate::config::PowFilterConfig;
use crate::error::{ConfigError, FilterError};
use async_trait::async_trait;
use num_bigint::BigUint;
use sha2::{Digest, Sha256};
use types::ids::Hash256;
use types::numeric::parse_hex;
use types::order::Order;

pub struct PowFilter {
    pub difficulty: BigUint,
}

impl PowFilter {
    pub fn from_config(config: &PowFilterConfig) -> Result<Self, ConfigError> {
        let difficulty = parse_hex(&config.difficulty)
            .ok_or_else(|| ConfigError::InvalidDifficulty(config.difficulty.clone()))?;
        Ok(Self { difficulty })
    }
}

/// `SHA-256(v ∥ r ∥ s ∥ LE64(nonce))` as an unsigned big-endian integer.
pub fn proof_of_work(v: u8, r: &Hash256, s: &Hash256, nonce: u64) -> BigUint {
    let mut hasher = Sha256::new();
    hasher.update([v]);
    hasher.update(r.as_bytes());
    hasher.update(s.as_bytes());
    hasher.update(nonce.to_le_bytes());
    BigUint::from_bytes_be(&hasher.finalize())
}

#[async_trait]
impl Filter for PowFilter {
    fn name(&self) -> &'static str {
        "pow"
    }

    async fn filter(&self, order: &mut Order) -> Result<(), FilterError> {
        if order.pow_nonce == 0 {
            return Err(FilterError::InvalidPowNonce);
        }
        if proof_of_work(order.v, &order.r, &order.s, order.pow_nonce) < self.difficulty {
            return Err(FilterError::InvalidPow);
        }
        Ok(())
    }
}
