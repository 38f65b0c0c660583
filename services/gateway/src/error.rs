//! Gateway error taxonomy
//!
//! Four families: malformed input (pricing, config), economic rejection
//! (one variant per filter reason, surfaced verbatim), duplicate submission
//! (a first-class outcome, never conflated with rejection) and upstream
//! unavailability (retryable by the caller).

use thiserror::Error;
use types::errors::{ProviderError, SignatureError};

/// Rejection reasons produced by the pricing primitive.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PricingError {
    #[error("order amounts must be positive")]
    InvalidAmount,

    #[error("token decimals missing or not positive")]
    InvalidDecimals,
}

/// Errors raised while building a pipeline from configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid pow difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("invalid address in config: {0}")]
    InvalidAddress(String),

    #[error("invalid minimum amount for {0}: {1}")]
    InvalidMinAmount(String, String),

    #[error("max price must be positive, got {0}")]
    InvalidMaxPrice(i64),
}

/// A filter stage rejection. The pipeline stops at the first one and the
/// message is surfaced verbatim to the submitter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid pow nonce")]
    InvalidPowNonce,

    #[error("invalid pow")]
    InvalidPow,

    #[error("protocol and delegate are not matched")]
    UnrelatedProtocol,

    #[error("market order auth private key not correct")]
    AuthKeyMismatch,

    #[error("owner holds less than {min} {symbol}")]
    InsufficientFeeTokenHold { symbol: String, min: i64 },

    #[error("order hash is not set")]
    MissingHash,

    #[error("order owner address is zero")]
    ZeroOwner,

    #[error("tokenB and tokenS are identical")]
    IdenticalTokens,

    #[error("price is not generated")]
    MissingPrice,

    #[error("price out of range")]
    PriceOutOfRange,

    #[error("valid since is too far in the future")]
    ValidSinceTooFar,

    #[error("order expired, please check validUntil")]
    Expired,

    #[error("margin split percentage out of range")]
    SplitPercentageOutOfRange,

    #[error("tokenS is not supported")]
    UnsupportedSellToken,

    #[error("tokenS amount is too small")]
    SellAmountTooSmall,

    #[error(transparent)]
    Signature(#[from] SignatureError),

    #[error("order owner and signer address are not matched")]
    SignerMismatch,

    #[error("tokenS {0} is not supported")]
    TokenSNotSupported(String),

    #[error("tokenB {0} is not supported")]
    TokenBNotSupported(String),

    #[error("order is sealed by an owner cutoff")]
    Cutoff,
}

/// Terminal outcome of one admission call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AdmissionError {
    #[error("unsupported market for tokens {token_s}/{token_b}")]
    UnsupportedMarket { token_s: String, token_b: String },

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Rejected(#[from] FilterError),

    #[error("order existed, please not submit again")]
    Duplicate { order_hash: String },

    #[error("order store unavailable: {0}")]
    Upstream(ProviderError),
}

/// Wallet API signature verification failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid timestamp: {0}")]
    BadTimestamp(String),

    #[error("timestamp had expired")]
    TimestampExpired,

    #[error("malformed signature component")]
    MalformedSignature,

    #[error("malformed owner address: {0}")]
    MalformedOwner(String),

    #[error("sign address not matched")]
    SignMismatch,
}
