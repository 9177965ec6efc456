//! Tolerant scalar coercion for raw log tokens
//!
//! Every value read from a training log goes through [`coerce`], which picks
//! the most specific scalar type the token plausibly represents.

use std::fmt;

/// A scalar value read from a log line
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `true` / `false`, case-insensitive
    Bool(bool),
    /// Base-10 integer
    Int(i64),
    /// Base-10 integer outside the `i64` range, as canonical digits
    BigInt(String),
    /// Floating-point number
    Float(f64),
    /// Anything else, trimmed
    Str(String),
}

impl Value {
    /// Numeric view of the value. Booleans and strings are not numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::BigInt(digits) => digits.parse().ok(),
            Value::Float(f) => Some(*f),
            Value::Bool(_) | Value::Str(_) => None,
        }
    }

    /// Whether the value counts as a missing observation (NaN)
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_nan())
    }

    /// Whether the value is an integer or a float
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::BigInt(_) | Value::Float(_))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::BigInt(digits) => f.write_str(digits),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Str(s) => f.write_str(s),
        }
    }
}

/// Convert a raw token into the most specific plausible scalar.
///
/// Order matters: boolean, then integer, then float, then the trimmed
/// string. Integer is tried before float so `"3"` stays an integer.
/// Never fails.
pub fn coerce(raw: &str) -> Value {
    let token = raw.trim();

    if token.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Some(value) = integer(token) {
        return value;
    }
    if let Ok(x) = token.parse::<f64>() {
        return Value::Float(x);
    }

    Value::Str(token.to_string())
}

/// Exact integer for an optionally signed run of ASCII digits.
///
/// Values beyond `i64` keep their digits (leading zeros and `+` dropped)
/// instead of being rounded through `f64`.
pub fn integer(token: &str) -> Option<Value> {
    if let Ok(i) = token.parse::<i64>() {
        return Some(Value::Int(i));
    }

    let (negative, digits) = match token.as_bytes().first()? {
        b'-' => (true, &token[1..]),
        b'+' => (false, &token[1..]),
        _ => (false, token),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    // Anything that failed the i64 parse here is too large to be zero
    let digits = digits.trim_start_matches('0');
    let sign = if negative { "-" } else { "" };
    Some(Value::BigInt(format!("{}{}", sign, digits)))
}

/// Shortest round-trip rendering with two-digit signed exponents
/// (`1e-05`, `1e+20`) and lowercase `nan`/`inf`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }

    let repr = format!("{:?}", x);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}
