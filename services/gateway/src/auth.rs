//! Wallet API signature verification
//!
//! Account-bound API calls carry a detached signature over a unix-seconds
//! timestamp string. Signatures more than ten minutes away from the relay's
//! clock, in either direction, are refused.

use crate::error::AuthError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use types::ids::{Address, Hash256};
use types::order::recover_address;

const MAX_SKEW_SECS: i64 = 60 * 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInfo {
    pub owner: String,
    pub r: String,
    pub s: String,
    pub v: u8,
    /// Unix seconds, as the exact string that was signed.
    pub timestamp: String,
}

/// Verify a timestamped account signature.
pub fn verify_sign(sign: &SignInfo) -> Result<(), AuthError> {
    let ts: i64 = sign
        .timestamp
        .parse()
        .map_err(|_| AuthError::BadTimestamp(sign.timestamp.clone()))?;
    let now = Utc::now().timestamp();
    if (now - ts).abs() > MAX_SKEW_SECS {
        return Err(AuthError::TimestampExpired);
    }

    let digest: [u8; 32] = Keccak256::digest(sign.timestamp.as_bytes()).into();
    let hash = Hash256::new(digest);
    let r = Hash256::from_hex(&sign.r).map_err(|_| AuthError::MalformedSignature)?;
    let s = Hash256::from_hex(&sign.s).map_err(|_| AuthError::MalformedSignature)?;
    let recovered = recover_address(&hash, sign.v, &r, &s).map_err(|_| AuthError::SignMismatch)?;

    let owner = Address::from_hex(&sign.owner)
        .map_err(|_| AuthError::MalformedOwner(sign.owner.clone()))?;
    if recovered != owner {
        return Err(AuthError::SignMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::ecdsa::SigningKey;
    use types::order::address_of_key;

    fn signed_info(timestamp: i64, key: &SigningKey, owner: Option<String>) -> SignInfo {
        let timestamp = timestamp.to_string();
        let digest: [u8; 32] = Keccak256::digest(timestamp.as_bytes()).into();
        let (signature, recid) = key.sign_prehash_recoverable(&digest).unwrap();
        let (r, s) = signature.split_bytes();

        SignInfo {
            owner: owner
                .unwrap_or_else(|| address_of_key(key.verifying_key()).to_string()),
            r: Hash256::new(r.into()).to_string(),
            s: Hash256::new(s.into()).to_string(),
            v: recid.to_byte(),
            timestamp,
        }
    }

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&k256::FieldBytes::clone_from_slice(&[0x21; 32])).unwrap()
    }

    #[test]
    fn test_accepts_fresh_signature() {
        let key = signing_key();
        let info = signed_info(Utc::now().timestamp(), &key, None);
        assert_eq!(verify_sign(&info), Ok(()));
    }

    #[test]
    fn test_rejects_stale_timestamp() {
        let key = signing_key();
        let info = signed_info(Utc::now().timestamp() - 601, &key, None);
        assert_eq!(verify_sign(&info), Err(AuthError::TimestampExpired));
    }

    #[test]
    fn test_rejects_future_timestamp() {
        let key = signing_key();
        let info = signed_info(Utc::now().timestamp() + 601, &key, None);
        assert_eq!(verify_sign(&info), Err(AuthError::TimestampExpired));
    }

    #[test]
    fn test_rejects_foreign_owner() {
        let key = signing_key();
        let info = signed_info(
            Utc::now().timestamp(),
            &key,
            Some(Address::new([0x99; 20]).to_string()),
        );
        assert_eq!(verify_sign(&info), Err(AuthError::SignMismatch));
    }

    #[test]
    fn test_rejects_unparsable_timestamp() {
        let key = signing_key();
        let mut info = signed_info(Utc::now().timestamp(), &key, None);
        info.timestamp = "yesterday".to_string();
        assert!(matches!(verify_sign(&info), Err(AuthError::BadTimestamp(_))));
    }
}
