//! Filter and gateway configuration
//!
//! Mirrors the deployment-facing options blocks: big-integer thresholds
//! arrive as strings (decimal for amounts, hex for the proof-of-work
//! difficulty) and are parsed once when the pipeline is built.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    pub base: BaseFilterConfig,
    pub pow: PowFilterConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseFilterConfig {
    /// Registered (protocol, delegate) address pairs, hex-encoded.
    pub protocol_delegates: Vec<(String, String)>,
    /// Symbol of the platform fee token.
    pub fee_token: String,
    /// Fee-token hold, in whole tokens, an owner must exceed when buying
    /// anything other than the fee token itself.
    pub min_fee_token_hold: i64,
    /// Prices must lie within `[1/max_price, max_price]`.
    pub max_price: i64,
    pub min_split_percentage: f64,
    pub max_split_percentage: f64,
    /// Per-symbol minimum sell amounts, decimal strings in raw token units.
    pub min_token_s_amount: HashMap<String, String>,
    /// How far into the future `valid_since` may lie, in seconds.
    pub max_valid_since_interval: i64,
}

impl Default for BaseFilterConfig {
    fn default() -> Self {
        Self {
            protocol_delegates: Vec::new(),
            fee_token: "LRC".to_string(),
            min_fee_token_hold: 0,
            max_price: 1_000_000,
            min_split_percentage: 0.0,
            max_split_percentage: 1.0,
            min_token_s_amount: HashMap::new(),
            max_valid_since_interval: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowFilterConfig {
    /// Difficulty threshold as a hex string; digests below it are refused.
    pub difficulty: String,
}

impl Default for PowFilterConfig {
    fn default() -> Self {
        Self {
            difficulty: "0x0".to_string(),
        }
    }
}

/// Behavior toggles for the admission entry point.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayOptions {
    /// Whether this relay re-broadcasts orders to peers.
    pub is_broadcast: bool,
    /// How many times an order may be re-broadcast before resubmissions
    /// stop being forwarded.
    pub max_broadcast_time: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FiltersConfig::default();
        assert_eq!(config.base.fee_token, "LRC");
        assert_eq!(config.pow.difficulty, "0x0");
        assert!(!GatewayOptions::default().is_broadcast);
    }

    #[test]
    fn test_config_deserializes_from_json() {
        let raw = r#"{
            "base": {
                "protocol_delegates": [["0x0101010101010101010101010101010101010101",
                                        "0x0202020202020202020202020202020202020202"]],
                "fee_token": "LRC",
                "min_fee_token_hold": 100,
                "max_price": 10000,
                "min_split_percentage": 0.0,
                "max_split_percentage": 0.8,
                "min_token_s_amount": {"WETH": "1000000000000000000"},
                "max_valid_since_interval": 600
            },
            "pow": {"difficulty": "0x1f"}
        }"#;
        let config: FiltersConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.base.min_fee_token_hold, 100);
        assert_eq!(config.pow.difficulty, "0x1f");
        assert_eq!(config.base.min_token_s_amount["WETH"], "1000000000000000000");
    }
}
