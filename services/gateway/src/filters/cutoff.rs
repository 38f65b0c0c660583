//! Cutoff stage
//!
//! Orders created at or before an owner's mass-cancel boundary for the
//! protocol and token pair never enter the book.

use super::Filter;
use crate::error::FilterError;
use async_trait::async_trait;
use std::sync::Arc;
use types::order::Order;
use types::provider::OrderViewer;

pub struct CutoffFilter {
    viewer: Arc<dyn OrderViewer>,
}

impl CutoffFilter {
    pub fn new(viewer: Arc<dyn OrderViewer>) -> Self {
        Self { viewer }
    }
}

#[async_trait]
impl Filter for CutoffFilter {
    fn name(&self) -> &'static str {
        "cutoff"
    }

    async fn filter(&self, order: &mut Order) -> Result<(), FilterError> {
        let sealed = self
            .viewer
            .is_order_cutoff(
                &order.protocol,
                &order.owner,
                &order.token_s,
                &order.token_b,
                order.valid_since,
            )
            .await;
        if sealed {
            return Err(FilterError::Cutoff);
        }
        Ok(())
    }
}
