//! Arbitrary-precision rational helpers and wire rendering
//!
//! Amounts stay `BigInt` and prices stay `BigRational` throughout the relay.
//! Floating point appears only in the rendering helpers below, which
//! reproduce the wire formatting digit for digit: depth rows carry
//! 10-decimal strings, order-book rows carry doubles squeezed through an
//! 8-decimal render-and-reparse.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

/// `10^exp` as a `BigInt`, the scale-factor form token decimals are
/// carried in everywhere.
pub fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10), exp as usize)
}

/// Parse a decimal string into a `BigInt` (config thresholds, raw amounts).
pub fn parse_dec(input: &str) -> Option<BigInt> {
    BigInt::parse_bytes(input.trim().as_bytes(), 10)
}

/// Parse a hex string, with or without a `0x` prefix, into a `BigUint`
/// (proof-of-work difficulty).
pub fn parse_hex(input: &str) -> Option<BigUint> {
    let digits = input
        .trim()
        .strip_prefix("0x")
        .or_else(|| input.trim().strip_prefix("0X"))
        .unwrap_or_else(|| input.trim());
    BigUint::parse_bytes(digits.as_bytes(), 16)
}

/// Render `value` with exactly `digits` fractional digits, rounding the
/// last digit to nearest with halves away from zero.
///
/// This is the depth bucket key: two prices land in the same bucket only
/// when this rendering matches exactly.
pub fn float_string(value: &BigRational, digits: usize) -> String {
    let numer = value.numer().abs();
    let denom = value.denom().abs();
    let scale = num_traits::pow(BigInt::from(10), digits);
    let (mut quot, rem) = (numer * &scale).div_rem(&denom);
    if rem * BigInt::from(2) >= denom {
        quot += 1;
    }

    let raw = quot.to_string();
    let padded = if raw.len() <= digits {
        format!("{:0>width$}", raw, width = digits + 1)
    } else {
        raw
    };
    let split = padded.len() - digits;
    let (int_part, frac_part) = padded.split_at(split);

    let sign = if value.is_negative() && !quot.is_zero() {
        "-"
    } else {
        ""
    };
    if digits == 0 {
        format!("{sign}{int_part}")
    } else {
        format!("{sign}{int_part}.{frac_part}")
    }
}

/// Collapse a rational to the 8-decimal double used on order-book rows.
///
/// The double rounding (f64 first, then an `%.8f` render that is
/// re-parsed) matches the wire format byte for byte and must not be
/// simplified to a single rounding step.
pub fn round8(value: &BigRational) -> f64 {
    let f = value.to_f64().unwrap_or(0.0);
    format!("{f:.8}").parse().unwrap_or(f)
}

/// Render a rational as the 10-decimal size/amount column of a depth row.
pub fn format10(value: &BigRational) -> String {
    format!("{:.10}", value.to_f64().unwrap_or(0.0))
}

/// Big-endian 32-byte encoding of a non-negative integer, left-padded; the
/// low 32 bytes are kept if the value is wider.
pub fn to_bytes32(value: &BigInt) -> [u8; 32] {
    let (_, bytes) = value.to_bytes_be();
    let mut out = [0u8; 32];
    if bytes.len() >= 32 {
        out.copy_from_slice(&bytes[bytes.len() - 32..]);
    } else {
        out[32 - bytes.len()..].copy_from_slice(&bytes);
    }
    out
}
