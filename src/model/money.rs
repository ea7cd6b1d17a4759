//! Money type for turning amounts into display strings and keystrokes back into amounts.
//!
//! Amounts are held as `Decimal` in major units (dollars). Persisted amounts are `i64` minor units
//! (cents). Display strings always carry a dollar sign, commas, and exactly two fraction digits,
//! e.g. `$1,234.56`.
//!
//! Parsing is keystroke oriented: every digit in the input is pushed into the cents column and
//! everything else (dollar signs, commas, dots, letters) is dropped. This makes
//! `parse(format(x)) == round_to_two_digits(x)` hold for any non-negative amount below 10^12
//! minor units. Keystrokes past that bound are rejected.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Number of fraction digits shown and stored.
const CENT_DIGITS: u32 = 2;

/// Amounts are kept below 10^12 minor units, so at most this many digits are read.
const MAX_DIGITS: usize = 12;

/// Represents a money amount in major units.
///
/// # Examples
///
/// Keystrokes are read as cents:
/// ```
/// # use my_finances::model::Money;
/// # use std::str::FromStr;
/// let money = Money::from_str("500").unwrap();
/// assert_eq!(money.to_string(), "$5.00");
/// ```
///
/// A formatted string parses back to the same value:
/// ```
/// # use my_finances::model::Money;
/// # use std::str::FromStr;
/// let money = Money::from_str("$1,234.56").unwrap();
/// assert_eq!(money.minor_units(), Some(123456));
/// assert_eq!(money.to_string(), "$1,234.56");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money {
    value: Decimal,
}

impl Money {
    pub const ZERO: Money = Money {
        value: Decimal::ZERO,
    };

    /// Creates a new `Money` from a `Decimal` value in major units.
    pub const fn new(value: Decimal) -> Self {
        Self { value }
    }

    /// Creates a new `Money` from an amount of minor units, e.g. `500` -> `$5.00`.
    pub fn from_minor_units(minor: i64) -> Self {
        Self::new(Decimal::new(minor, CENT_DIGITS))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns the amount in minor units, rounding half-up at the cent boundary first. `None` if
    /// that does not fit in an `i64`.
    pub fn minor_units(&self) -> Option<i64> {
        to_minor_units(self.value)
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }
}

/// An error that can occur when keystrokes cannot be read as an amount.
#[derive(Debug)]
pub enum MoneyError {
    /// More significant digits were typed than an amount may hold.
    TooManyDigits(usize),
    Decimal(rust_decimal::Error),
}

impl Display for MoneyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            MoneyError::TooManyDigits(n) => {
                write!(f, "{n} digits were typed but at most {MAX_DIGITS} are allowed")
            }
            MoneyError::Decimal(e) => Display::fmt(e, f),
        }
    }
}

impl Error for MoneyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MoneyError::TooManyDigits(_) => None,
            MoneyError::Decimal(e) => Some(e),
        }
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits: String = s.chars().filter(char::is_ascii_digit).collect();
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Money::ZERO);
        }
        if digits.len() > MAX_DIGITS {
            return Err(MoneyError::TooManyDigits(digits.len()));
        }
        let cents = Decimal::from_str(digits).map_err(MoneyError::Decimal)?;
        let mut value = cents / Decimal::ONE_HUNDRED;
        value.rescale(CENT_DIGITS);
        Ok(Money::new(value))
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let rounded = round_to_two_digits(self.value);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let num = rounded.abs().to_f64().unwrap_or_default();
        write!(f, "{sign}${}", format_num::format_num!(",.2", num))
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Money::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money::new(value)
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.value()
    }
}

/// Formats `amount` as a currency display string with exactly two fraction digits.
pub fn format_money(amount: Decimal) -> String {
    Money::new(amount).to_string()
}

/// Parses keystrokes into an amount, see [`Money`]'s `FromStr`.
pub fn parse_amount(text: &str) -> Result<Decimal, MoneyError> {
    Money::from_str(text).map(|m| m.value())
}

/// Half-up rounding (away from zero) at the cent boundary.
pub fn round_to_two_digits(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CENT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
}

/// Converts a major-unit amount into minor units, rounding to the nearest cent first. Returns
/// `None` when the result does not fit in an `i64`.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    round_to_two_digits(amount)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.to_i64())
}

/// Converts minor units into a major-unit amount.
pub fn from_minor_units(minor: i64) -> Decimal {
    Decimal::new(minor, CENT_DIGITS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_keystrokes_are_cents() {
        assert_eq!(parse_amount("500").unwrap(), dec("5.00"));
        assert_eq!(parse_amount("5").unwrap(), dec("0.05"));
    }

    #[test]
    fn test_parse_strips_symbols_and_letters() {
        assert_eq!(parse_amount("$1,234.56").unwrap(), dec("1234.56"));
        assert_eq!(parse_amount("USD 12.00abc").unwrap(), dec("12.00"));
    }

    #[test]
    fn test_parse_empty_and_zeros() {
        assert_eq!(parse_amount("").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("$0.00").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("abc").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("0007").unwrap(), dec("0.07"));
    }

    #[test]
    fn test_parse_too_many_digits() {
        let text = "9".repeat(40);
        assert!(parse_amount(&text).is_err());
        assert!(matches!(
            parse_amount("12345678901234567890"),
            Err(MoneyError::TooManyDigits(20))
        ));
        // leading zeros do not count
        assert_eq!(parse_amount("000999999999999").unwrap(), dec("9999999999.99"));
        assert!(parse_amount("1000000000000").is_err());
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn test_display_commas() {
        assert_eq!(format_money(dec("1234567.8")), "$1,234,567.80");
    }

    #[test]
    fn test_display_negative() {
        assert_eq!(format_money(dec("-50")), "-$50.00");
    }

    #[test]
    fn test_display_rounds_half_up() {
        assert_eq!(format_money(dec("0.125")), "$0.13");
        assert_eq!(format_money(dec("0.124")), "$0.12");
    }

    #[test]
    fn test_round_to_two_digits() {
        assert_eq!(round_to_two_digits(dec("2.675")), dec("2.68"));
        assert_eq!(round_to_two_digits(dec("2.674")), dec("2.67"));
        assert_eq!(round_to_two_digits(dec("-2.675")), dec("-2.68"));
    }

    #[test]
    fn test_round_trip_cents() {
        for cents in [0_i64, 1, 999, 123456] {
            let amount = from_minor_units(cents);
            let parsed = parse_amount(&format_money(amount)).unwrap();
            assert_eq!(parsed, amount, "cents {cents}");
        }
    }

    #[test]
    fn test_round_trip_unrounded() {
        let x = dec("10.005");
        assert_eq!(
            parse_amount(&format_money(x)).unwrap(),
            round_to_two_digits(x)
        );
    }

    #[test]
    fn test_round_trip_large() {
        let amount = from_minor_units(999_999_999_999);
        assert_eq!(parse_amount(&format_money(amount)).unwrap(), amount);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(to_minor_units(dec("5.00")), Some(500));
        assert_eq!(to_minor_units(dec("0.015")), Some(2));
        assert_eq!(Money::from_minor_units(123456).minor_units(), Some(123456));
    }

    #[test]
    fn test_minor_units_overflow() {
        assert_eq!(to_minor_units(dec("123456789012345678.90")), None);
        assert_eq!(to_minor_units(Decimal::MAX), None);
    }

    #[test]
    fn test_serde() {
        let money = Money::from_minor_units(5000);
        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"$50.00\"");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back, money);
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::from_minor_units(1).is_positive());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::ZERO.is_negative());
        assert!(Money::from_minor_units(-1).is_negative());
    }
}
