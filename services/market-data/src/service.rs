//! Order-book query service
//!
//! Resolves a market query, pulls the live ask/bid working sets from the
//! order store and renders either merged depth or the flattened book. Asks
//! are the orders selling the base token, bids the ones selling the quote;
//! each side's sell-token decimals ride along for scaling.

use crate::amounts::AmountCalculator;
use crate::depth::{calculate_depth, DepthLevel};
use crate::error::BookError;
use crate::order_book::{generate_book, BookRow};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use types::ids::Address;
use types::numeric::pow10;
use types::order::OrderState;
use types::provider::{AccountStateProvider, OrderViewer, TokenRegistry};
use types::token::Token;

/// Price levels kept per depth side.
const DEFAULT_DEPTH_LENGTH: usize = 100;
/// Rows kept per flattened-book side.
const DEFAULT_BOOK_LENGTH: usize = 40;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthQuery {
    pub delegate_address: String,
    pub market: String,
    /// Optional result-length cap; each mode has its own default.
    #[serde(default)]
    pub length: Option<usize>,
}

/// Merged depth for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depth {
    pub delegate_address: String,
    pub market: String,
    pub buy: Vec<DepthLevel>,
    pub sell: Vec<DepthLevel>,
}

/// Flattened per-order book for one market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub delegate_address: String,
    pub market: String,
    pub buy: Vec<BookRow>,
    pub sell: Vec<BookRow>,
}

pub struct OrderBookService {
    registry: Arc<dyn TokenRegistry>,
    viewer: Arc<dyn OrderViewer>,
    calculator: AmountCalculator,
    fee_token: String,
}

impl OrderBookService {
    pub fn new(
        registry: Arc<dyn TokenRegistry>,
        viewer: Arc<dyn OrderViewer>,
        accounts: Arc<dyn AccountStateProvider>,
    ) -> Self {
        Self {
            registry,
            viewer,
            calculator: AmountCalculator::new(accounts),
            fee_token: "LRC".to_string(),
        }
    }

    pub fn with_fee_token(mut self, fee_token: impl Into<String>) -> Self {
        self.fee_token = fee_token.into();
        self
    }

    pub fn with_calculator(mut self, calculator: AmountCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Merged price-level depth, at most 100 levels a side (asks may carry
    /// one extra level, see `depth` module).
    pub async fn depth(&self, query: &DepthQuery) -> Result<Depth, BookError> {
        let (delegate, base, quote, market) = self.resolve_query(query)?;
        let length = query.length.unwrap_or(DEFAULT_DEPTH_LENGTH);
        let (asks, bids) = self.inner_book(&delegate, &base, &quote, length).await?;

        let sell = calculate_depth(
            &self.calculator,
            &asks,
            length,
            true,
            &base.decimals,
            &quote.decimals,
        )
        .await;
        let buy = calculate_depth(
            &self.calculator,
            &bids,
            length,
            false,
            &quote.decimals,
            &base.decimals,
        )
        .await;

        Ok(Depth {
            delegate_address: query.delegate_address.clone(),
            market,
            buy,
            sell,
        })
    }

    /// Flattened per-order book, at most 40 rows a side (asks may carry one
    /// extra row).
    pub async fn order_book(&self, query: &DepthQuery) -> Result<OrderBook, BookError> {
        let (delegate, base, quote, market) = self.resolve_query(query)?;
        let length = query.length.unwrap_or(DEFAULT_BOOK_LENGTH);
        let (asks, bids) = self.inner_book(&delegate, &base, &quote, length).await?;

        let fee_decimals = self
            .registry
            .token_by_symbol(&self.fee_token)
            .map(|token| token.decimals)
            .unwrap_or_else(|| pow10(18));

        let sell = generate_book(
            &self.calculator,
            &asks,
            true,
            &base.decimals,
            &quote.decimals,
            &fee_decimals,
            length,
        )
        .await;
        let buy = generate_book(
            &self.calculator,
            &bids,
            false,
            &quote.decimals,
            &base.decimals,
            &fee_decimals,
            length,
        )
        .await;

        Ok(OrderBook {
            delegate_address: query.delegate_address.clone(),
            market,
            buy,
            sell,
        })
    }

    /// Structural validation first, then market resolution; the pair is
    /// checked against the registry before any store round-trip.
    fn resolve_query(
        &self,
        query: &DepthQuery,
    ) -> Result<(Address, Token, Token, String), BookError> {
        let market = query.market.trim().to_uppercase();
        if market.is_empty() {
            return Err(BookError::InvalidDelegateAddress);
        }
        let delegate = parse_delegate(&query.delegate_address)?;

        let (base_symbol, quote_symbol) =
            unwrap_market(&market).ok_or(BookError::MarketNotFound)?;
        let base = self
            .registry
            .token_by_symbol(base_symbol)
            .ok_or(BookError::MarketNotFound)?;
        let quote = self
            .registry
            .token_by_symbol(quote_symbol)
            .ok_or(BookError::MarketNotFound)?;
        self.registry
            .resolve_market(&base.protocol, &quote.protocol)
            .ok_or(BookError::MarketNotFound)?;

        Ok((delegate, base, quote, market))
    }

    async fn inner_book(
        &self,
        delegate: &Address,
        base: &Token,
        quote: &Token,
        length: usize,
    ) -> Result<(Vec<OrderState>, Vec<OrderState>), BookError> {
        let asks = self
            .viewer
            .orders_for_pair(delegate, &base.protocol, &quote.protocol, length)
            .await
            .map_err(|_| BookError::UpstreamQueryFailed { side: "ask" })?;
        let bids = self
            .viewer
            .orders_for_pair(delegate, &quote.protocol, &base.protocol, length)
            .await
            .map_err(|_| BookError::UpstreamQueryFailed { side: "bid" })?;
        Ok((asks, bids))
    }
}

fn parse_delegate(raw: &str) -> Result<Address, BookError> {
    Address::from_hex(raw).map_err(|_| BookError::InvalidDelegateAddress)
}

/// Split `"BASE-QUOTE"` into its symbols.
fn unwrap_market(market: &str) -> Option<(&str, &str)> {
    let (base, quote) = market.split_once('-')?;
    if base.is_empty() || quote.is_empty() {
        return None;
    }
    Some((base, quote))
}
