//! Token metadata and market resolution
//!
//! Tokens are registry entries keyed by their contract address. `decimals`
//! is carried as the power-of-ten scale factor (`10^d`), the form every
//! scaling computation consumes it in.

use crate::ids::Address;
use crate::order::Side;
use crate::provider::TokenRegistry;
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Registry entry for a supported token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub symbol: String,
    pub protocol: Address,
    /// Power-of-ten scale factor, e.g. `10^18`.
    pub decimals: BigInt,
    /// Denied tokens stay resolvable but are refused at admission.
    pub deny: bool,
}

impl Token {
    pub fn new(symbol: impl Into<String>, protocol: Address, decimal_exp: u32) -> Self {
        Self {
            symbol: symbol.into(),
            protocol,
            decimals: crate::numeric::pow10(decimal_exp),
            deny: false,
        }
    }

    pub fn denied(mut self) -> Self {
        self.deny = true;
        self
    }
}

/// A resolved trading pair: the base token is quoted in units of the quote
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketPair {
    pub base: Token,
    pub quote: Token,
}

impl MarketPair {
    /// Canonical market symbol, `"BASE-QUOTE"`.
    pub fn symbol(&self) -> String {
        format!("{}-{}", self.base.symbol, self.quote.symbol)
    }

    /// Side of an order inside this market: selling the quote token means
    /// buying the base.
    pub fn side_of(&self, token_s: &Address) -> Side {
        if *token_s == self.quote.protocol {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

/// In-memory `TokenRegistry` backed by a static token list and an ordered
/// quote-priority list: the first listed symbol present in a pair becomes
/// the quote side.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    tokens: Vec<Token>,
    quotes: Vec<String>,
}

impl StaticRegistry {
    pub fn new(tokens: Vec<Token>, quotes: Vec<String>) -> Self {
        Self { tokens, quotes }
    }

    pub fn insert(&mut self, token: Token) {
        self.tokens.push(token);
    }
}

impl TokenRegistry for StaticRegistry {
    fn token_by_address(&self, address: &Address) -> Option<Token> {
        self.tokens.iter().find(|t| t.protocol == *address).cloned()
    }

    fn token_by_symbol(&self, symbol: &str) -> Option<Token> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
            .cloned()
    }

    fn resolve_market(&self, token_a: &Address, token_b: &Address) -> Option<MarketPair> {
        let a = self.token_by_address(token_a)?;
        let b = self.token_by_address(token_b)?;
        for quote in &self.quotes {
            if b.symbol.eq_ignore_ascii_case(quote) {
                return Some(MarketPair { base: a, quote: b });
            }
            if a.symbol.eq_ignore_ascii_case(quote) {
                return Some(MarketPair { base: b, quote: a });
            }
        }
        None
    }
}
