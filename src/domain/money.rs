use crate::error::CheckoutError;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The only currency the checkout works with.
pub const CURRENCY: &str = "EUR";

/// Represents a positive amount the user is asked to pay.
///
/// This is a wrapper around `rust_decimal::Decimal` that guarantees the value
/// is strictly positive. On the wire it is a plain JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, CheckoutError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(CheckoutError::MalformedData(
                "Amount must be positive".to_string(),
            ))
        }
    }

    /// Skips validation; only for compile-time constants known to be positive.
    pub(crate) const fn from_positive(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = CheckoutError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Parses user input such as `19.99`, `19,99` or `€ 1.459,00`.
impl FromStr for Amount {
    type Err = CheckoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s
            .trim()
            .trim_start_matches('€')
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        // A comma followed by exactly two digits at the end is a decimal separator,
        // every other separator groups thousands.
        let normalized = match cleaned.rfind(',') {
            Some(pos) if cleaned.len() - pos <= 3 && !cleaned[pos..].contains('.') => {
                let (int_part, frac_part) = cleaned.split_at(pos);
                format!("{}.{}", int_part.replace('.', ""), &frac_part[1..])
            }
            _ => cleaned.replace(',', ""),
        };

        let value = Decimal::from_str(&normalized).map_err(|_| {
            CheckoutError::MalformedData(format!("'{}' is not a valid amount", s.trim()))
        })?;
        Self::new(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// A monetary value tagged with its currency, as used by method bounds and price tiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyAmount {
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub currency: String,
}

impl CurrencyAmount {
    pub fn eur(value: Decimal) -> Self {
        Self {
            value,
            currency: CURRENCY.to_string(),
        }
    }
}
