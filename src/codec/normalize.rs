//! Hex field normalization
//!
//! The provider contract takes every scalar as a `0x`-prefixed, even-length
//! hex string. Generator output is neither reliably prefixed nor padded.

use crate::infra::{OrandError, Result};

/// Hex digits in one 32-byte field element
pub const FIELD_ELEMENT_DIGITS: usize = 64;

/// Hex digits in a concatenated pair of field elements
pub const FIELD_PAIR_DIGITS: usize = 2 * FIELD_ELEMENT_DIGITS;

/// Strip a leading `0x` or `0X`, if any.
pub fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

/// Left-pad to an even digit count and add a `0x` prefix.
///
/// Idempotent over hex input. Digits are not validated; the empty string
/// becomes `0x`.
pub fn normalize_hex(value: &str) -> String {
    let digits = strip_hex_prefix(value);
    if digits.len() % 2 == 0 {
        format!("0x{digits}")
    } else {
        format!("0x0{digits}")
    }
}

fn ensure_hex_digits(field: &'static str, digits: &str) -> Result<()> {
    match digits.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        Some((index, c)) => Err(OrandError::malformed(
            field,
            format!("non-hex character {c:?} at offset {index}"),
        )),
        None => Ok(()),
    }
}

/// Validate and normalize a single scalar field.
pub fn normalize_scalar(field: &'static str, value: &str) -> Result<String> {
    let digits = strip_hex_prefix(value);
    if digits.is_empty() {
        return Err(OrandError::malformed(field, "empty value"));
    }
    ensure_hex_digits(field, digits)?;
    Ok(normalize_hex(digits))
}

/// Split two concatenated field elements into normalized halves.
///
/// The value must hold exactly `FIELD_PAIR_DIGITS` hex digits after an
/// optional prefix; anything else is rejected rather than truncated.
pub fn split_field_pair(field: &'static str, value: &str) -> Result<[String; 2]> {
    let digits = strip_hex_prefix(value);
    ensure_hex_digits(field, digits)?;
    if digits.len() != FIELD_PAIR_DIGITS {
        return Err(OrandError::malformed(
            field,
            format!(
                "expected {FIELD_PAIR_DIGITS} hex digits, got {}",
                digits.len()
            ),
        ));
    }

    let (high, low) = digits.split_at(FIELD_ELEMENT_DIGITS);
    Ok([normalize_hex(high), normalize_hex(low)])
}
