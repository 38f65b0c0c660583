//! Order lifecycle types
//!
//! An `Order` is immutable once signed: its content hash covers every signed
//! field, and the hash plus `(v, r, s)` identify the signer. `OrderState` is
//! the mutable projection the store keeps on top of an order (dealt,
//! cancelled and split amounts per side), which the relay core only reads.

use crate::errors::SignatureError;
use crate::ids::{Address, Hash256};
use crate::numeric::to_bytes32;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Order flavor: plain market orders carry an embedded auth key, peer-to-peer
/// orders are settled directly between two wallets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    Market,
    P2p,
}

/// Which side of a market an order sits on, as seen from the base token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Lifecycle status of a stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Admitted, nothing settled yet
    New,
    /// Partially filled, still live
    Partial,
    /// Fully settled (terminal)
    Finished,
    /// Cancelled by the owner (terminal)
    Cancelled,
    /// Swept by an owner-wide cutoff (terminal)
    Cutoff,
    /// Passed its `valid_until` (terminal)
    Expired,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Finished | OrderStatus::Cancelled | OrderStatus::Cutoff | OrderStatus::Expired
        )
    }
}

/// A signed trade order.
///
/// The raw fields up to `s` are fixed by the client's signature; `hash`,
/// `price`, `market` and `side` are derived during admission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub protocol: Address,
    pub delegate_address: Address,
    pub owner: Address,
    pub auth_addr: Address,
    /// Throwaway key embedded in market orders; never part of the hash.
    pub auth_private_key: Option<Hash256>,
    pub token_s: Address,
    pub token_b: Address,
    pub amount_s: BigInt,
    pub amount_b: BigInt,
    /// Unix seconds
    pub valid_since: i64,
    /// Unix seconds
    pub valid_until: i64,
    pub lrc_fee: BigInt,
    pub buy_no_more_than_amount_b: bool,
    /// 0..=100
    pub margin_split_percentage: u8,
    pub order_type: OrderType,
    pub pow_nonce: u64,
    pub v: u8,
    pub r: Hash256,
    pub s: Hash256,

    // Derived at admission time
    pub hash: Hash256,
    pub price: Option<BigRational>,
    pub market: Option<String>,
    pub side: Option<Side>,
}

impl Order {
    /// Content hash over every signed field.
    ///
    /// Deterministic: any mutation of a signed field yields a different
    /// hash. The proof-of-work nonce and the signature are excluded, since
    /// the signature is taken over this hash.
    pub fn generate_hash(&self) -> Hash256 {
        let mut hasher = Keccak256::new();
        hasher.update(self.delegate_address.as_bytes());
        hasher.update(self.owner.as_bytes());
        hasher.update(self.token_s.as_bytes());
        hasher.update(self.token_b.as_bytes());
        hasher.update(self.auth_addr.as_bytes());
        hasher.update(to_bytes32(&self.amount_s));
        hasher.update(to_bytes32(&self.amount_b));
        hasher.update(to_bytes32(&BigInt::from(self.valid_since)));
        hasher.update(to_bytes32(&BigInt::from(self.valid_until)));
        hasher.update(to_bytes32(&self.lrc_fee));
        hasher.update([self.buy_no_more_than_amount_b as u8]);
        hasher.update([self.margin_split_percentage]);
        Hash256::new(hasher.finalize().into())
    }

    /// Recover the signing address from the stored `(v, r, s)` over `hash`.
    pub fn signer_address(&self) -> Result<Address, SignatureError> {
        recover_address(&self.hash, self.v, &self.r, &self.s)
    }
}

/// Recover the signer of `hash` from a `(v, r, s)` signature. `v` is
/// accepted as a raw recovery id (0/1) or in its 27/28 form.
pub fn recover_address(
    hash: &Hash256,
    v: u8,
    r: &Hash256,
    s: &Hash256,
) -> Result<Address, SignatureError> {
    let recid_byte = if v >= 27 { v - 27 } else { v };
    let recid = RecoveryId::from_byte(recid_byte).ok_or(SignatureError::InvalidRecoveryId(v))?;
    let signature = Signature::from_scalars(*r.as_bytes(), *s.as_bytes())
        .map_err(|_| SignatureError::InvalidScalars)?;
    let key = VerifyingKey::recover_from_prehash(hash.as_bytes().as_slice(), &signature, recid)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(address_of_key(&key))
}

/// The address controlled by a public key: the low 20 bytes of the
/// Keccak-256 of the uncompressed point.
pub fn address_of_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let digest = Keccak256::digest(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&digest[12..]);
    Address::new(out)
}

/// The address controlled by a raw secp256k1 secret (embedded auth keys).
pub fn address_of_secret(secret: &Hash256) -> Result<Address, SignatureError> {
    let bytes = k256::FieldBytes::clone_from_slice(secret.as_bytes());
    let key = SigningKey::from_bytes(&bytes).map_err(|_| SignatureError::InvalidSecretKey)?;
    Ok(address_of_key(key.verifying_key()))
}

/// Mutable store projection over an immutable order.
///
/// Amounts are monotonically non-decreasing over the order's life; the relay
/// core never writes them, it only derives remaining quantities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderState {
    pub raw_order: Order,
    pub dealt_amount_s: BigInt,
    pub dealt_amount_b: BigInt,
    pub cancelled_amount_s: BigInt,
    pub cancelled_amount_b: BigInt,
    pub split_amount_s: BigInt,
    pub split_amount_b: BigInt,
    pub status: OrderStatus,
    pub updated_block: u64,
    pub broadcast_time: u32,
}

impl OrderState {
    /// Fresh projection for a newly admitted order: nothing dealt, nothing
    /// cancelled, nothing split.
    pub fn new_from_order(raw_order: Order) -> Self {
        Self {
            raw_order,
            dealt_amount_s: BigInt::zero(),
            dealt_amount_b: BigInt::zero(),
            cancelled_amount_s: BigInt::zero(),
            cancelled_amount_b: BigInt::zero(),
            split_amount_s: BigInt::zero(),
            split_amount_b: BigInt::zero(),
            status: OrderStatus::New,
            updated_block: 0,
            broadcast_time: 0,
        }
    }

    /// Un-dealt, un-cancelled, un-split quantity on each side, in raw token
    /// units.
    ///
    /// The side named by `buy_no_more_than_amount_b` is reduced directly and
    /// the opposite side follows through the order's fixed exchange rate, so
    /// a partially filled order never implies a price different from the one
    /// it was signed with.
    pub fn remained_amount(&self) -> (BigRational, BigRational) {
        let order = &self.raw_order;
        if order.buy_no_more_than_amount_b {
            let reduced =
                &self.dealt_amount_b + &self.cancelled_amount_b + &self.split_amount_b;
            let remained_b = BigRational::from(&order.amount_b - reduced);
            let sell_price = BigRational::new(order.amount_s.clone(), order.amount_b.clone());
            let remained_s = &remained_b * sell_price;
            (remained_s, remained_b)
        } else {
            let reduced =
                &self.dealt_amount_s + &self.cancelled_amount_s + &self.split_amount_s;
            let remained_s = BigRational::from(&order.amount_s - reduced);
            let buy_price = BigRational::new(order.amount_b.clone(), order.amount_s.clone());
            let remained_b = &remained_s * buy_price;
            (remained_s, remained_b)
        }
    }

    /// Project the lifecycle status from the settled amounts.
    ///
    /// Dustiness is an input: whether the residual value is worth keeping
    /// live is a valuation question answered outside the core.
    pub fn settle_status(&mut self, is_cancel: bool, is_dust: bool) {
        let finished_s = &self.cancelled_amount_s + &self.dealt_amount_s + &self.split_amount_s;
        let finished_b = &self.cancelled_amount_b + &self.dealt_amount_b + &self.split_amount_b;
        let total = finished_s + finished_b;

        self.status = if total.is_zero() {
            OrderStatus::New
        } else if !is_dust {
            OrderStatus::Partial
        } else if is_cancel {
            OrderStatus::Cancelled
        } else {
            OrderStatus::Finished
        };
    }
}
