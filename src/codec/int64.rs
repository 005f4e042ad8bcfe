/*!
 * 64-bit Integer Codec
 *
 * Encodes and decodes signed/unsigned 64-bit integers in a requested byte
 * order, independent of host order. Values always pass through a big-endian
 * scratch buffer; little-endian targets get an explicit reversal pass.
 */

use crate::core::errors::{RefError, RefResult};
use crate::core::limits::{INT64_WIDTH, MAX_SAFE_MAGNITUDE};
use crate::core::types::Endianness;
use crate::types::Value;
use std::fmt;

const NO_DIGITS: &str = "no digits found in input string";
const OUT_OF_RANGE: &str = "input string numerical value out of range";

/// Which 64-bit range a value is checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signedness {
    Signed,
    Unsigned,
}

impl Signedness {
    /// Inclusive bounds of the 64-bit range
    pub const fn bounds(self) -> (i128, i128) {
        match self {
            Signedness::Signed => (i64::MIN as i128, i64::MAX as i128),
            Signedness::Unsigned => (0, u64::MAX as i128),
        }
    }

    pub fn contains(self, value: i128) -> bool {
        let (min, max) = self.bounds();
        (min..=max).contains(&value)
    }
}

impl fmt::Display for Signedness {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Signedness::Signed => write!(f, "int64"),
            Signedness::Unsigned => write!(f, "uint64"),
        }
    }
}

/// Parse integer text the way `strtoll` does
///
/// Leading whitespace and a sign are skipped; `0x` selects hex, a leading
/// `0` selects octal, anything else is decimal. Parsing stops at the first
/// character that is not a digit of the chosen base.
pub fn parse_integer_text(text: &str, signedness: Signedness) -> RefResult<i128> {
    let mut rest = text.trim_start();

    let negative = match rest.as_bytes().first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let bytes = rest.as_bytes();
    let (radix, digits) = match bytes {
        [b'0', b'x' | b'X', next, ..] if next.is_ascii_hexdigit() => (16, &rest[2..]),
        [b'0', ..] => (8, rest),
        _ => (10, rest),
    };

    let mut magnitude: i128 = 0;
    let mut seen = 0usize;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        magnitude = magnitude
            .checked_mul(i128::from(radix))
            .and_then(|m| m.checked_add(i128::from(digit)))
            .ok_or_else(|| RefError::range(OUT_OF_RANGE))?;
        seen += 1;
    }

    if seen == 0 {
        return Err(RefError::invalid_input(NO_DIGITS));
    }

    let value = if negative { -magnitude } else { magnitude };
    if !signedness.contains(value) {
        return Err(RefError::range(OUT_OF_RANGE));
    }

    Ok(value)
}

/// Integer a value stands for, checked against the 64-bit range
pub fn integer_from_value(value: &Value, signedness: Signedness) -> RefResult<i128> {
    let integer = match value {
        Value::Int(i) => i128::from(*i),
        Value::Bool(b) => i128::from(*b),
        Value::Text(s) => return parse_integer_text(s, signedness),
        Value::Float(f) if f.is_finite() && f.fract() == 0.0 => *f as i128,
        Value::Float(f) => {
            return Err(RefError::invalid_input(format!(
                "{} is not an integer and cannot be written as {}",
                f, signedness
            )))
        }
        other => {
            return Err(RefError::invalid_input(format!(
                "expected a number or numeric text for {}, got {}",
                signedness,
                other.kind_name()
            )))
        }
    };

    if !signedness.contains(integer) {
        return Err(RefError::range(OUT_OF_RANGE));
    }
    Ok(integer)
}

/// Dual-form read result: a number while exactly representable as a double,
/// the exact decimal text otherwise
pub fn to_value(value: i128) -> Value {
    if value.abs() <= MAX_SAFE_MAGNITUDE {
        // |value| <= 2^53 always fits in i64
        Value::Int(value as i64)
    } else {
        Value::Text(value.to_string())
    }
}

/// Encode `value` into 8 bytes in `order`
pub fn encode(value: &Value, signedness: Signedness, order: Endianness) -> RefResult<[u8; INT64_WIDTH]> {
    let integer = integer_from_value(value, signedness)?;

    let mut scratch = [0u8; INT64_WIDTH];
    let mut rest = integer as u64;
    for slot in scratch.iter_mut().rev() {
        *slot = (rest & 0xff) as u8;
        rest >>= 8;
    }

    Ok(reorder(scratch, order))
}

/// Decode 8 bytes stored in `order`
pub fn decode(bytes: &[u8], signedness: Signedness, order: Endianness) -> RefResult<Value> {
    let stored: [u8; INT64_WIDTH] = bytes.try_into().map_err(|_| {
        RefError::invalid_input(format!(
            "expected {} bytes for {}, got {}",
            INT64_WIDTH,
            signedness,
            bytes.len()
        ))
    })?;
    let scratch = reorder(stored, order);

    let raw = scratch
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
    let integer = match signedness {
        Signedness::Signed => i128::from(raw as i64),
        Signedness::Unsigned => i128::from(raw),
    };

    Ok(to_value(integer))
}

/// Convert between canonical (big-endian) order and `order`
fn reorder(mut bytes: [u8; INT64_WIDTH], order: Endianness) -> [u8; INT64_WIDTH] {
    if order == Endianness::Little {
        bytes.reverse();
    }
    bytes
}
