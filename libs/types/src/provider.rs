//! Collaborator contracts consumed by the relay core
//!
//! The core never persists, broadcasts or queries chains itself: token
//! metadata, account state and order storage are reached through these
//! traits, and lifecycle events are handed back to the caller as data.
//! Implementations may block on network or database I/O; the core imposes
//! no timeout of its own.

use crate::errors::ProviderError;
use crate::ids::{Address, Hash256};
use crate::order::OrderState;
use crate::token::{MarketPair, Token};
use async_trait::async_trait;
use num_bigint::BigInt;
use std::collections::HashMap;

/// Static token and market metadata, resolved in memory.
pub trait TokenRegistry: Send + Sync {
    fn token_by_address(&self, address: &Address) -> Option<Token>;

    fn token_by_symbol(&self, symbol: &str) -> Option<Token>;

    /// Resolve the trading pair for two token addresses, deciding which of
    /// the two is the quote currency.
    fn resolve_market(&self, token_a: &Address, token_b: &Address) -> Option<MarketPair>;
}

/// Balance and allowance lookups against live chain state.
#[async_trait]
pub trait AccountStateProvider: Send + Sync {
    /// Token balance of `owner` and the amount `spender` is approved to
    /// move, in raw token units.
    async fn balance_and_allowance(
        &self,
        owner: &Address,
        token: &Address,
        spender: &Address,
    ) -> Result<(BigInt, BigInt), ProviderError>;

    /// All token balances of an owner, keyed by symbol.
    async fn balances_by_symbol(
        &self,
        owner: &Address,
    ) -> Result<HashMap<String, BigInt>, ProviderError>;
}

/// Read access to the persisted order working set.
#[async_trait]
pub trait OrderViewer: Send + Sync {
    async fn find_by_hash(&self, hash: &Hash256) -> Result<Option<OrderState>, ProviderError>;

    /// Whether the owner issued a mass-cancel for this protocol and token
    /// pair at or after `valid_since`.
    async fn is_order_cutoff(
        &self,
        protocol: &Address,
        owner: &Address,
        token_s: &Address,
        token_b: &Address,
        valid_since: i64,
    ) -> bool;

    /// Live orders selling `token_s` for `token_b` under a delegate, capped
    /// at `limit` entries.
    async fn orders_for_pair(
        &self,
        delegate: &Address,
        token_s: &Address,
        token_b: &Address,
        limit: usize,
    ) -> Result<Vec<OrderState>, ProviderError>;

    /// Persist a bumped broadcast counter for an already-stored order.
    async fn update_broadcast_time(
        &self,
        hash: &Hash256,
        count: u32,
    ) -> Result<(), ProviderError>;
}
