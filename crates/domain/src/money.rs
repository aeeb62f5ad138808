//! Money value object.
//!
//! Amounts are whole yen held as `u64` and capped at [`MAX_SAFE_INTEGER`] so
//! values survive a round trip through JSON numbers. Every fallible operation
//! returns a new `Money` or a [`MoneyError`]; nothing clamps.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest amount representable (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Consumption tax rate, in percent.
pub const TAX_RATE_PERCENT: u32 = 10;

/// Errors produced by money arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Negative amount, negative factor, or an out-of-range rate.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// The result would exceed the safe integer range.
    #[error("Amount overflow: {0}")]
    Overflow(String),
}

/// An immutable, non-negative amount of yen.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u64", into = "u64")]
pub struct Money {
    amount: u64,
}

impl Money {
    /// Returns zero yen.
    pub const fn zero() -> Self {
        Self { amount: 0 }
    }

    /// Creates money from a signed integer, rejecting negatives and values
    /// beyond [`MAX_SAFE_INTEGER`].
    pub fn from_integer(amount: i64) -> Result<Self, MoneyError> {
        let amount = u64::try_from(amount).map_err(|_| {
            MoneyError::InvalidAmount(format!("{amount} is negative"))
        })?;
        Self::checked(amount)
    }

    /// Creates money from an unsigned amount.
    pub fn from_yen(amount: u64) -> Result<Self, MoneyError> {
        Self::checked(amount)
    }

    fn checked(amount: u64) -> Result<Self, MoneyError> {
        if amount > MAX_SAFE_INTEGER {
            return Err(MoneyError::Overflow(format!(
                "{amount} exceeds {MAX_SAFE_INTEGER}"
            )));
        }
        Ok(Self { amount })
    }

    /// Returns the amount in yen.
    pub fn amount(&self) -> u64 {
        self.amount
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    /// Returns true if the amount is greater than zero.
    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    /// Adds another amount.
    pub fn add(&self, other: Money) -> Result<Money, MoneyError> {
        let sum = self.amount.checked_add(other.amount).ok_or_else(|| {
            MoneyError::Overflow(format!("{} + {}", self.amount, other.amount))
        })?;
        Self::checked(sum)
    }

    /// Subtracts another amount. Fails if the result would be negative.
    pub fn subtract(&self, other: Money) -> Result<Money, MoneyError> {
        self.amount
            .checked_sub(other.amount)
            .map(|amount| Money { amount })
            .ok_or_else(|| {
                MoneyError::InvalidAmount(format!(
                    "{} - {} would be negative",
                    self.amount, other.amount
                ))
            })
    }

    /// Multiplies by a non-negative factor, rounding the result up.
    pub fn multiply(&self, factor: Decimal) -> Result<Money, MoneyError> {
        if factor < Decimal::ZERO {
            return Err(MoneyError::InvalidAmount(format!(
                "factor {factor} is negative"
            )));
        }
        let overflow = || MoneyError::Overflow(format!("{} * {factor}", self.amount));
        let product = Decimal::from(self.amount)
            .checked_mul(factor)
            .ok_or_else(overflow)?;
        let amount = product.ceil().to_u64().ok_or_else(overflow)?;
        Self::checked(amount)
    }

    /// Multiplies by a whole quantity.
    pub fn times(&self, quantity: u32) -> Result<Money, MoneyError> {
        let amount = self
            .amount
            .checked_mul(u64::from(quantity))
            .ok_or_else(|| MoneyError::Overflow(format!("{} * {quantity}", self.amount)))?;
        Self::checked(amount)
    }

    /// Returns the amount including consumption tax, rounded up.
    pub fn with_tax(&self) -> Result<Money, MoneyError> {
        self.multiply(tax_multiplier())
    }

    /// Returns the tax portion: `with_tax() - self`.
    pub fn tax_amount(&self) -> Result<Money, MoneyError> {
        self.with_tax()?.subtract(*self)
    }

    /// Returns `rate` (between 0 and 1) of this amount, rounded up.
    pub fn percentage(&self, rate: Decimal) -> Result<Money, MoneyError> {
        if rate < Decimal::ZERO || rate > Decimal::ONE {
            return Err(MoneyError::InvalidAmount(format!(
                "rate {rate} must be between 0 and 1"
            )));
        }
        self.multiply(rate)
    }

    /// Returns the amount after a `percent` (0-100) discount, rounded up.
    pub fn apply_discount(&self, percent: Decimal) -> Result<Money, MoneyError> {
        if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
            return Err(MoneyError::InvalidAmount(format!(
                "discount {percent}% must be between 0 and 100"
            )));
        }
        self.multiply((Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED)
    }

    /// Sums a sequence of amounts, failing on overflow.
    pub fn sum<I>(amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.add(amount))
    }
}

fn tax_multiplier() -> Decimal {
    Decimal::from(100 + TAX_RATE_PERCENT) / Decimal::ONE_HUNDRED
}

impl TryFrom<u64> for Money {
    type Error = MoneyError;

    fn try_from(amount: u64) -> Result<Self, Self::Error> {
        Self::checked(amount)
    }
}

impl From<Money> for u64 {
    fn from(money: Money) -> Self {
        money.amount
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let digits = self.amount.to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        write!(f, "¥{grouped}")
    }
}
