//! Shared error taxonomy for the relay type layer
//!
//! Service-level rejection reasons live with the services; this module only
//! carries the errors produced by the types themselves and by collaborator
//! lookups.

use thiserror::Error;

/// Errors from parsing fixed-width hex identities.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseIdError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Errors surfaced by collaborator lookups (account state, order store).
///
/// The relay core treats these conservatively: fail-closed for admission
/// checks, retryable for order-book queries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("record not found")]
    NotFound,

    #[error("upstream unavailable: {0}")]
    Unavailable(String),
}

/// Errors from signature recovery over an order or auth payload.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("invalid signature scalars")]
    InvalidScalars,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("invalid secret key")]
    InvalidSecretKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id_error_display() {
        let err = ParseIdError::InvalidLength {
            expected: 20,
            actual: 19,
        };
        assert_eq!(err.to_string(), "invalid byte length: expected 20, got 19");
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Unavailable("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
