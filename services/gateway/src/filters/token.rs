//! Token-support stage
//!
//! Both legs of the order must resolve in the registry and not be flagged
//! as denied.

use super::Filter;
use crate::error::FilterError;
use async_trait::async_trait;
use std::sync::Arc;
use types::ids::Address;
use types::order::Order;
use types::provider::TokenRegistry;

pub struct TokenFilter {
    registry: Arc<dyn TokenRegistry>,
}

impl TokenFilter {
    pub fn new(registry: Arc<dyn TokenRegistry>) -> Self {
        Self { registry }
    }

    fn supported(&self, address: &Address) -> bool {
        self.registry
            .token_by_address(address)
            .map(|token| !token.deny)
            .unwrap_or(false)
    }
}

#[async_trait]
impl Filter for TokenFilter {
    fn name(&self) -> &'static str {
        "token"
    }

    async fn filter(&self, order: &mut Order) -> Result<(), FilterError> {
        if !self.supported(&order.token_s) {
            return Err(FilterError::TokenSNotSupported(order.token_s.to_string()));
        }
        if !self.supported(&order.token_b) {
            return Err(FilterError::TokenBNotSupported(order.token_b.to_string()));
        }
        Ok(())
    }
}
