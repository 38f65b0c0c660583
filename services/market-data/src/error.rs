//! Order-book query errors

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    /// The market symbol or delegate address did not parse.
    #[error("market and correct contract address must be applied")]
    InvalidDelegateAddress,

    /// The pair is not served by this relay.
    #[error("unsupported market type")]
    MarketNotFound,

    /// The ask- or bid-side store lookup failed; safe to retry.
    #[error("get {side} order error, please refresh again")]
    UpstreamQueryFailed { side: &'static str },
}
