//! Lifecycle events returned by the admission entry point
//!
//! The admission call reports the events it wants published instead of
//! firing them into a message bus from inside business logic; delivery
//! semantics (synchronous, queued, retried) stay with the caller.

use crate::order::{Order, OrderState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type")]
pub enum RelayEvent {
    /// First sighting of an order: hand it to peer relays. Fired before
    /// filtering, independent of the admission outcome.
    NewOrderForBroadcast { order: Order },

    /// The order passed every filter and should be persisted.
    NewOrder { state: OrderState },
}

impl RelayEvent {
    /// Event kind as a string label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayEvent::NewOrderForBroadcast { .. } => "NewOrderForBroadcast",
            RelayEvent::NewOrder { .. } => "NewOrder",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{Address, Hash256};
    use crate::order::{OrderType, Order};
    use num_bigint::BigInt;

    fn minimal_order() -> Order {
        Order {
            protocol: Address::zero(),
            delegate_address: Address::zero(),
            owner: Address::zero(),
            auth_addr: Address::zero(),
            auth_private_key: None,
            token_s: Address::new([1; 20]),
            token_b: Address::new([2; 20]),
            amount_s: BigInt::from(1),
            amount_b: BigInt::from(1),
            valid_since: 0,
            valid_until: 0,
            lrc_fee: BigInt::from(0),
            buy_no_more_than_amount_b: false,
            margin_split_percentage: 0,
            order_type: OrderType::Market,
            pow_nonce: 1,
            v: 0,
            r: Hash256::zero(),
            s: Hash256::zero(),
            hash: Hash256::zero(),
            price: None,
            market: None,
            side: None,
        }
    }

    #[test]
    fn test_event_kind_labels() {
        let event = RelayEvent::NewOrderForBroadcast {
            order: minimal_order(),
        };
        assert_eq!(event.kind(), "NewOrderForBroadcast");
    }

    #[test]
    fn test_event_serde_tagging() {
        let event = RelayEvent::NewOrderForBroadcast {
            order: minimal_order(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"NewOrderForBroadcast\""));
    }
}
