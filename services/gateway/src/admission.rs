//! Admission entry point
//!
//! Receives a signed order, derives its hash, market and price, runs the
//! validation pipeline and reports the lifecycle events the caller should
//! publish. Duplicate submissions are a first-class outcome, distinct from
//! filter rejections.
//!
//! Concurrency note: the duplicate check and the eventual persist are not
//! atomic. Two identical orders submitted at the same instant can both pass
//! the check; the store is the final arbiter.

use crate::config::GatewayOptions;
use crate::error::AdmissionError;
use crate::filters::ValidationPipeline;
use crate::pricing;
use std::sync::Arc;
use types::events::RelayEvent;
use types::ids::Hash256;
use types::order::{Order, OrderState};
use types::provider::{OrderViewer, TokenRegistry};

/// Outcome of one admission call.
///
/// `events` must be published by the caller regardless of `outcome`;
/// delivery semantics (synchronous, queued, retried) are not the gateway's
/// concern.
#[derive(Debug)]
pub struct AdmissionResult {
    pub order_hash: Hash256,
    pub events: Vec<RelayEvent>,
    pub outcome: Result<OrderState, AdmissionError>,
}

pub struct Gateway {
    pipeline: ValidationPipeline,
    registry: Arc<dyn TokenRegistry>,
    viewer: Arc<dyn OrderViewer>,
    options: GatewayOptions,
}

impl Gateway {
    pub fn new(
        pipeline: ValidationPipeline,
        registry: Arc<dyn TokenRegistry>,
        viewer: Arc<dyn OrderViewer>,
        options: GatewayOptions,
    ) -> Self {
        Self {
            pipeline,
            registry,
            viewer,
            options,
        }
    }

    /// Admit one order. The returned hash identifies the submission even
    /// when the outcome is an error.
    pub async fn handle_order(&self, mut order: Order) -> AdmissionResult {
        order.hash = order.generate_hash();
        let order_hash = order.hash;

        let mut events = Vec::new();
        let outcome = self.admit(order, &mut events).await;
        AdmissionResult {
            order_hash,
            events,
            outcome,
        }
    }

    async fn admit(
        &self,
        mut order: Order,
        events: &mut Vec<RelayEvent>,
    ) -> Result<OrderState, AdmissionError> {
        let pair = self
            .registry
            .resolve_market(&order.token_b, &order.token_s)
            .ok_or_else(|| AdmissionError::UnsupportedMarket {
                token_s: order.token_s.to_string(),
                token_b: order.token_b.to_string(),
            })?;
        order.market = Some(pair.symbol());
        order.side = Some(pair.side_of(&order.token_s));

        match self.viewer.find_by_hash(&order.hash).await {
            Ok(None) => {
                // Peers hear about the order before filtering decides its
                // fate.
                events.push(RelayEvent::NewOrderForBroadcast {
                    order: order.clone(),
                });

                pricing::generate_price(&mut order, self.registry.as_ref())?;
                self.pipeline.validate(&mut order).await?;

                let state = OrderState::new_from_order(order);
                events.push(RelayEvent::NewOrder {
                    state: state.clone(),
                });
                Ok(state)
            }
            Ok(Some(existing)) => {
                let broadcast_time = existing.broadcast_time + 1;
                if self.options.is_broadcast && broadcast_time < self.options.max_broadcast_time {
                    events.push(RelayEvent::NewOrderForBroadcast {
                        order: existing.raw_order.clone(),
                    });
                    self.viewer
                        .update_broadcast_time(&existing.raw_order.hash, broadcast_time)
                        .await
                        .map_err(AdmissionError::Upstream)?;
                }

                tracing::info!(
                    order_hash = %existing.raw_order.hash,
                    "order exists, will not insert again"
                );
                Err(AdmissionError::Duplicate {
                    order_hash: existing.raw_order.hash.to_string(),
                })
            }
            Err(err) => Err(AdmissionError::Upstream(err)),
        }
    }
}
