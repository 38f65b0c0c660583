//! Base eligibility stage
//!
//! A composite of structural and economic checks evaluated in a fixed
//! order; the first failure wins. The fee-token hold check reads live
//! account state and fails closed when the lookup does.

use super::Filter;
use crate::config::BaseFilterConfig;
use crate::error::{ConfigError, FilterError};
use async_trait::async_trait;
use chrono::Utc;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use types::ids::Address;
use types::numeric::parse_dec;
use types::order::{address_of_secret, Order, OrderType};
use types::provider::{AccountStateProvider, TokenRegistry};

pub struct BaseFilter {
    registry: Arc<dyn TokenRegistry>,
    accounts: Arc<dyn AccountStateProvider>,
    protocol_delegates: HashSet<(Address, Address)>,
    fee_token: String,
    min_fee_token_hold: i64,
    max_price: BigInt,
    min_split_percentage: f64,
    max_split_percentage: f64,
    min_token_s_amount: HashMap<String, BigInt>,
    max_valid_since_interval: i64,
}

impl BaseFilter {
    pub fn from_config(
        config: &BaseFilterConfig,
        registry: Arc<dyn TokenRegistry>,
        accounts: Arc<dyn AccountStateProvider>,
    ) -> Result<Self, ConfigError> {
        if config.max_price <= 0 {
            return Err(ConfigError::InvalidMaxPrice(config.max_price));
        }

        let mut protocol_delegates = HashSet::new();
        for (protocol, delegate) in &config.protocol_delegates {
            let protocol = Address::from_hex(protocol)
                .map_err(|_| ConfigError::InvalidAddress(protocol.clone()))?;
            let delegate = Address::from_hex(delegate)
                .map_err(|_| ConfigError::InvalidAddress(delegate.clone()))?;
            protocol_delegates.insert((protocol, delegate));
        }

        let mut min_token_s_amount = HashMap::new();
        for (symbol, raw) in &config.min_token_s_amount {
            let amount = parse_dec(raw)
                .ok_or_else(|| ConfigError::InvalidMinAmount(symbol.clone(), raw.clone()))?;
            min_token_s_amount.insert(symbol.clone(), amount);
        }

        Ok(Self {
            registry,
            accounts,
            protocol_delegates,
            fee_token: config.fee_token.clone(),
            min_fee_token_hold: config.min_fee_token_hold,
            max_price: BigInt::from(config.max_price),
            min_split_percentage: config.min_split_percentage,
            max_split_percentage: config.max_split_percentage,
            min_token_s_amount,
            max_valid_since_interval: config.max_valid_since_interval,
        })
    }

    fn is_related_protocol(&self, protocol: &Address, delegate: &Address) -> bool {
        self.protocol_delegates.contains(&(*protocol, *delegate))
    }

    /// Strictly more than the configured hold is required; a failed lookup
    /// or a missing balance entry counts as not holding enough.
    async fn holds_enough_fee_token(&self, owner: &Address) -> bool {
        let Some(fee_token) = self.registry.token_by_symbol(&self.fee_token) else {
            return false;
        };
        let Ok(balances) = self.accounts.balances_by_symbol(owner).await else {
            return false;
        };
        let Some(balance) = balances.get(&fee_token.symbol) else {
            return false;
        };
        let min_hold = BigInt::from(self.min_fee_token_hold) * &fee_token.decimals;
        *balance > min_hold
    }
}

#[async_trait]
impl Filter for BaseFilter {
    fn name(&self) -> &'static str {
        "base"
    }

    async fn filter(&self, order: &mut Order) -> Result<(), FilterError> {
        if !self.is_related_protocol(&order.protocol, &order.delegate_address) {
            return Err(FilterError::UnrelatedProtocol);
        }

        if order.order_type == OrderType::Market {
            let derived = order
                .auth_private_key
                .as_ref()
                .and_then(|secret| address_of_secret(secret).ok());
            if derived != Some(order.auth_addr) {
                return Err(FilterError::AuthKeyMismatch);
            }
        }

        let fee_token_address = self
            .registry
            .token_by_symbol(&self.fee_token)
            .map(|t| t.protocol);
        if fee_token_address != Some(order.token_b) && !self.holds_enough_fee_token(&order.owner).await {
            return Err(FilterError::InsufficientFeeTokenHold {
                symbol: self.fee_token.clone(),
                min: self.min_fee_token_hold,
            });
        }

        if order.hash.is_zero() {
            return Err(FilterError::MissingHash);
        }
        if order.token_b == order.token_s {
            return Err(FilterError::IdenticalTokens);
        }
        if order.owner.is_zero() {
            return Err(FilterError::ZeroOwner);
        }

        let price = order.price.as_ref().ok_or(FilterError::MissingPrice)?;
        let upper = BigRational::from(self.max_price.clone());
        let lower = BigRational::new(BigInt::one(), self.max_price.clone());
        if *price > upper || *price < lower {
            return Err(FilterError::PriceOutOfRange);
        }

        let now = Utc::now().timestamp();
        if order.valid_since - self.max_valid_since_interval > now {
            return Err(FilterError::ValidSinceTooFar);
        }
        if order.valid_until < now {
            return Err(FilterError::Expired);
        }

        let split = f64::from(order.margin_split_percentage) / 100.0;
        if split < self.min_split_percentage || split > self.max_split_percentage {
            return Err(FilterError::SplitPercentageOutOfRange);
        }

        let token_s = self
            .registry
            .token_by_address(&order.token_s)
            .ok_or(FilterError::UnsupportedSellToken)?;
        if let Some(min_amount) = self.min_token_s_amount.get(&token_s.symbol) {
            if order.amount_s < *min_amount {
                return Err(FilterError::SellAmountTooSmall);
            }
        }

        Ok(())
    }
}
