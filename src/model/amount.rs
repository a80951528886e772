//! Amount type for the unsigned monetary value of a transaction.
//!
//! Stored ledgers are not always consistent about how an amount was written: a form submission
//! stores the text the user typed (`"100"`, `"12.5"`) while other writers store a JSON number.
//! `Amount` accepts both and always writes a numeric string, so no precision is lost to `f64`.

use anyhow::{bail, Context};
use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest amount a single new transaction may carry, in currency units.
pub const MAX_AMOUNT: i64 = 1_000_000_000_000_000;

/// The magnitude of a transaction. The sign lives in `TransactionType`, never in the value.
///
/// # Examples
///
/// ```
/// # use ledger_highlights::model::Amount;
/// let from_text: Amount = serde_json::from_str("\"40.5\"").unwrap();
/// let from_number: Amount = serde_json::from_str("40.5").unwrap();
/// assert_eq!(from_text, from_number);
/// assert_eq!(serde_json::to_string(&from_number).unwrap(), "\"40.5\"");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Parses user input for a new transaction. Unlike `FromStr`, this rejects zero and negative
    /// values since a ledger amount never carries a sign.
    pub(crate) fn parse_positive(s: &str) -> crate::error::Res<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            bail!("Amount is required");
        }
        let amount = Amount::from_str(trimmed)
            .with_context(|| format!("Amount must be numeric, got '{trimmed}'"))?;
        if !amount.is_positive() {
            bail!("Amount must be greater than zero, got '{trimmed}'");
        }
        if amount.value() > Decimal::from(MAX_AMOUNT) {
            bail!("Amount must not exceed {MAX_AMOUNT}, got '{trimmed}'");
        }
        Ok(amount)
    }
}

impl FromStr for Amount {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Values written by JavaScript-style writers may use exponent notation.
        let value = if trimmed.contains(['e', 'E']) {
            Decimal::from_scientific(trimmed)?
        } else {
            Decimal::from_str(trimmed)?
        };
        Ok(Amount(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or a numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::from_str(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        // Go through the shortest round-trip text so that 0.1 stays 0.1.
        Amount::from_str(&v.to_string()).map_err(E::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
