use std::{
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub},
};

use crate::{Currency, EngineError};

/// Signed money amount represented as integer **minor units**.
///
/// The finance API sends amounts as JSON numbers; they are converted once with
/// [`Money::from_major`] so sums and percentages never drift.
///
/// # Examples
///
/// ```rust
/// use engine::{Currency, Money};
///
/// let amount = Money::from_major(1234.5, Currency::Thb);
/// assert_eq!(amount.minor(), 123_450);
/// assert_eq!(amount.format(Currency::Thb), "฿1,234.50");
/// ```
///
/// Parsing user input (accepts `.` or `,` as decimal separator, rejects more
/// decimals than the currency has):
///
/// ```rust
/// use engine::{Currency, Money};
///
/// assert_eq!(Money::parse_major("10,5", Currency::Thb).unwrap().minor(), 1050);
/// assert!(Money::parse_major("12.345", Currency::Thb).is_err());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Creates a new amount from integer minor units.
    #[must_use]
    pub const fn new(minor: i64) -> Self {
        Self(minor)
    }

    /// Converts a decimal amount in major units, rounding half away from zero.
    ///
    /// Non-finite values map to zero.
    #[must_use]
    pub fn from_major(value: f64, currency: Currency) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        let scale = 10f64.powi(i32::from(currency.minor_units()));
        Self((value * scale).round() as i64)
    }

    /// Returns the raw value in minor units.
    #[must_use]
    pub const fn minor(self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn to_major(self, currency: Currency) -> f64 {
        let scale = 10f64.powi(i32::from(currency.minor_units()));
        self.0 as f64 / scale
    }

    #[must_use]
    pub const fn abs(self) -> Self {
        Self(self.0.abs())
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// Formats as `฿1,234.56`, with a leading `-` for negative amounts.
    #[must_use]
    pub fn format(self, currency: Currency) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = u32::from(currency.minor_units());
        let scale = 10u64.pow(digits);
        let abs = self.0.unsigned_abs();
        let major = group_thousands(abs / scale);
        if digits == 0 {
            return format!("{sign}{}{major}", currency.symbol());
        }
        let minor = abs % scale;
        format!(
            "{sign}{}{major}.{minor:0width$}",
            currency.symbol(),
            width = digits as usize
        )
    }

    /// Parses a decimal string in major units.
    ///
    /// Accepts `.` or `,` as decimal separator, an optional leading `+`/`-`
    /// and surrounding whitespace. Rejects more fraction digits than the
    /// currency supports.
    pub fn parse_major(input: &str, currency: Currency) -> Result<Self, EngineError> {
        let empty = || EngineError::InvalidAmount("empty amount".to_string());
        let invalid = || EngineError::InvalidAmount("invalid amount".to_string());
        let overflow = || EngineError::InvalidAmount("amount too large".to_string());

        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(empty());
        }

        let (negative, rest) = if let Some(stripped) = trimmed.strip_prefix('-') {
            (true, stripped)
        } else if let Some(stripped) = trimmed.strip_prefix('+') {
            (false, stripped)
        } else {
            (false, trimmed)
        };

        let rest = rest.trim().replace(',', ".");
        if rest.is_empty() {
            return Err(empty());
        }

        let mut parts = rest.split('.');
        let major_str = parts.next().ok_or_else(invalid)?;
        let fraction_str = parts.next();
        if parts.next().is_some() {
            return Err(invalid());
        }

        if major_str.is_empty() || !major_str.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        let major: i64 = major_str.parse().map_err(|_| overflow())?;

        let digits = usize::from(currency.minor_units());
        let fraction: i64 = match fraction_str {
            None | Some("") => 0,
            Some(frac) => {
                if !frac.chars().all(|c| c.is_ascii_digit()) {
                    return Err(invalid());
                }
                if frac.len() > digits {
                    return Err(EngineError::InvalidAmount("too many decimals".to_string()));
                }
                let padded = format!("{frac:0<digits$}");
                padded.parse().map_err(|_| invalid())?
            }
        };

        let scale = 10i64.pow(digits as u32);
        let total = major
            .checked_mul(scale)
            .and_then(|v| v.checked_add(fraction))
            .ok_or_else(overflow)?;

        Ok(Self(if negative { -total } else { total }))
    }
}

fn group_thousands(value: u64) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len() + raw.len() / 3);
    for (i, ch) in raw.chars().enumerate() {
        if i > 0 && (raw.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Self::Output {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Self::Output {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;

    fn neg(self) -> Self::Output {
        Money(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_groups_thousands() {
        assert_eq!(Money::new(0).format(Currency::Thb), "฿0.00");
        assert_eq!(Money::new(5).format(Currency::Thb), "฿0.05");
        assert_eq!(Money::new(99_999).format(Currency::Thb), "฿999.99");
        assert_eq!(Money::new(100_000).format(Currency::Thb), "฿1,000.00");
        assert_eq!(Money::new(123_456_789).format(Currency::Thb), "฿1,234,567.89");
        assert_eq!(Money::new(-150_050).format(Currency::Thb), "-฿1,500.50");
    }

    #[test]
    fn from_major_rounds_to_minor_units() {
        assert_eq!(Money::from_major(120.5, Currency::Thb).minor(), 12_050);
        assert_eq!(Money::from_major(0.125, Currency::Thb).minor(), 13);
        assert_eq!(Money::from_major(-3.333, Currency::Thb).minor(), -333);
        assert_eq!(Money::from_major(f64::NAN, Currency::Thb), Money::ZERO);
    }

    #[test]
    fn parse_accepts_dot_or_comma() {
        let thb = Currency::Thb;
        assert_eq!(Money::parse_major("10", thb).unwrap().minor(), 1000);
        assert_eq!(Money::parse_major("10.5", thb).unwrap().minor(), 1050);
        assert_eq!(Money::parse_major("10,50", thb).unwrap().minor(), 1050);
        assert_eq!(Money::parse_major("-0.01", thb).unwrap().minor(), -1);
        assert_eq!(Money::parse_major("  2.30 ", thb).unwrap().minor(), 230);
    }

    #[test]
    fn parse_rejects_garbage() {
        let thb = Currency::Thb;
        assert!(Money::parse_major("", thb).is_err());
        assert!(Money::parse_major("12.345", thb).is_err());
        assert!(Money::parse_major("1.2.3", thb).is_err());
        assert!(Money::parse_major("abc", thb).is_err());
        assert!(Money::parse_major(".5", thb).is_err());
    }

    #[test]
    fn sum_adds_minor_units() {
        let total: Money = [Money::new(100), Money::new(250), Money::new(-50)]
            .into_iter()
            .sum();
        assert_eq!(total, Money::new(300));
    }
}
