//! Input validation for `wordLength`.
//!
//! Untyped JSON is resolved once into a [`NumericInput`], then range-checked
//! into a [`WordLength`]. Buyer and seller run the same checks.

use std::fmt;

use alloy::primitives::U256;
use serde_json::Value;

use crate::X402Error;

const NOT_AN_INTEGER: &str = "wordLength must be a non-negative integer";
const NOT_NUMERIC: &str = "wordLength must be a numeric string";
const OUT_OF_RANGE: &str = "wordLength must be between 3 and 8";

/// A numeric value as it arrived: a JSON integer or a decimal string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NumericInput {
    Integer(U256),
    DecimalString(String),
}

impl NumericInput {
    /// Resolve an untyped JSON value.
    ///
    /// Integral floats such as `5.0` count as integers. Negative numbers,
    /// fractions, strings with anything but ASCII digits, and other JSON
    /// types are rejected.
    pub fn from_value(value: &Value) -> Result<Self, X402Error> {
        match value {
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    return Ok(Self::Integer(U256::from(u)));
                }
                match n.as_f64() {
                    Some(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => {
                        Ok(Self::Integer(U256::from(f as u128)))
                    }
                    _ => Err(X402Error::validation(NOT_AN_INTEGER)),
                }
            }
            Value::String(s) => {
                if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                    Ok(Self::DecimalString(s.clone()))
                } else {
                    Err(X402Error::validation(NOT_NUMERIC))
                }
            }
            _ => Err(X402Error::validation(NOT_AN_INTEGER)),
        }
    }

    /// Canonical non-negative integer value.
    pub fn normalize(&self) -> Result<U256, X402Error> {
        match self {
            Self::Integer(n) => Ok(*n),
            Self::DecimalString(s) => s
                .parse::<U256>()
                .map_err(|_| X402Error::validation(OUT_OF_RANGE)),
        }
    }
}

impl From<u64> for NumericInput {
    fn from(n: u64) -> Self {
        Self::Integer(U256::from(n))
    }
}

/// A validated word length, always within `3..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WordLength(u8);

impl WordLength {
    pub const MIN: u8 = 3;
    pub const MAX: u8 = 8;
    pub const DEFAULT: WordLength = WordLength(5);

    pub fn parse(input: &NumericInput) -> Result<Self, X402Error> {
        let n = input.normalize()?;
        if n < U256::from(Self::MIN) || n > U256::from(Self::MAX) {
            return Err(X402Error::validation(OUT_OF_RANGE));
        }
        Ok(Self(n.to::<u8>()))
    }

    /// Read `wordLength` from a request body field. Absent or `null` means the default.
    pub fn from_json(value: Option<&Value>) -> Result<Self, X402Error> {
        match value {
            None | Some(Value::Null) => Ok(Self::DEFAULT),
            Some(v) => Self::parse(&NumericInput::from_value(v)?),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn as_u256(self) -> U256 {
        U256::from(self.0)
    }
}

impl Default for WordLength {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for WordLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u64> for WordLength {
    type Error = X402Error;

    fn try_from(n: u64) -> Result<Self, Self::Error> {
        Self::parse(&NumericInput::from(n))
    }
}
