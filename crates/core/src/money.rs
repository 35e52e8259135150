//! Non-negative decimal price.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DomainError;
use crate::value_object::ValueObject;

const MINOR_PER_MAJOR: u64 = 100;

/// Largest amount a signed 64-bit column can hold.
const MAX_MINOR: u64 = i64::MAX as u64;

/// Price in smallest currency unit (two fractional digits).
///
/// Stored as an integer so that prices compare and hash exactly, which lets
/// them participate in search cache keys. On the wire it is a plain decimal
/// number (`12.5`).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

impl ValueObject for Price {}

impl Price {
    pub const ZERO: Price = Price(0);
    pub const MAX: Price = Price(MAX_MINOR);

    pub fn from_minor(minor: u64) -> Self {
        Self(minor)
    }

    /// Convert a decimal amount, rounding to the nearest minor unit.
    pub fn from_decimal(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::validation("price", "must be a finite number"));
        }
        if value < 0.0 {
            return Err(DomainError::validation("price", "must not be negative"));
        }
        let minor = (value * MINOR_PER_MAJOR as f64).round();
        // `MAX_MINOR as f64` rounds up to 2^63, so anything below it fits.
        if minor >= MAX_MINOR as f64 {
            return Err(DomainError::validation("price", "is too large"));
        }
        Ok(Self(minor as u64))
    }

    pub fn minor(&self) -> u64 {
        self.0
    }

    pub fn as_decimal(&self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}.{:02}",
            self.0 / MINOR_PER_MAJOR,
            self.0 % MINOR_PER_MAJOR
        )
    }
}

impl core::str::FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| DomainError::validation("price", format!("not a number: {s:?}")))?;
        Self::from_decimal(value)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Price::from_decimal(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_negative_and_non_finite() {
        assert!(Price::from_decimal(-0.01).is_err());
        assert!(Price::from_decimal(f64::NAN).is_err());
        assert!(Price::from_decimal(f64::INFINITY).is_err());
    }

    #[test]
    fn rejects_amounts_beyond_signed_64_bit_minor_units() {
        let err = Price::from_decimal(1e17).unwrap_err();
        assert_eq!(err.violations()[0].field, "price");
        assert!("1e17".parse::<Price>().is_err());

        let largest = Price::from_decimal(9.0e16).unwrap();
        assert!(largest <= Price::MAX);
        assert!(i64::try_from(largest.minor()).is_ok());
    }

    #[test]
    fn rounds_to_minor_units() {
        assert_eq!(Price::from_decimal(10.0).unwrap().minor(), 1000);
        assert_eq!(Price::from_decimal(0.016).unwrap().minor(), 2);
        assert_eq!(Price::from_decimal(19.99).unwrap().to_string(), "19.99");
        assert_eq!(Price::from_minor(5).to_string(), "0.05");
    }

    #[test]
    fn parses_from_query_strings() {
        assert_eq!("12.5".parse::<Price>().unwrap(), Price::from_minor(1250));
        assert!("abc".parse::<Price>().is_err());
        assert!("-1".parse::<Price>().is_err());
    }

    #[test]
    fn json_form_is_a_decimal_number() {
        let price = Price::from_minor(1250);
        assert_eq!(serde_json::to_string(&price).unwrap(), "12.5");
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }

    proptest! {
        /// Whole cents survive the decimal conversion unchanged.
        #[test]
        fn decimal_round_trip_preserves_minor_units(minor in 0u64..10_000_000_000) {
            let price = Price::from_minor(minor);
            prop_assert_eq!(Price::from_decimal(price.as_decimal()).unwrap(), price);
        }
    }
}
