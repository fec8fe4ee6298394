//! Fixed-point currency type.
//!
//! Balances, bets and payouts are integer cents internally and two-decimal
//! JSON numbers on the wire. Deserialization rejects negatives, non-finite
//! values and sub-cent precision so a malformed bet never reaches the ledger.

use crate::errors::{CasinoError, CasinoResult};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Largest representable amount: one trillion units. Keeps multiplier
/// arithmetic comfortably inside u64.
const MAX_CENTS: u64 = 1_000_000_000_000_00;

/// Currency amount in integer cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: u64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> u64 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse a JSON-style decimal amount, enforcing two-decimal precision.
    pub fn from_amount(amount: f64) -> CasinoResult<Self> {
        if !amount.is_finite() {
            return Err(CasinoError::InvalidRequest("amount must be finite".into()));
        }
        if amount < 0.0 {
            return Err(CasinoError::InvalidRequest(
                "amount must not be negative".into(),
            ));
        }
        let cents = (amount * 100.0).round();
        if cents > MAX_CENTS as f64 {
            return Err(CasinoError::InvalidRequest("amount too large".into()));
        }
        // Reject sub-cent precision rather than silently rounding it away.
        if (cents / 100.0 - amount).abs() > 1e-6 {
            return Err(CasinoError::InvalidRequest(
                "amount precision is limited to two decimals".into(),
            ));
        }
        Ok(Money(cents as u64))
    }

    pub fn to_amount(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Money> {
        self.0.checked_mul(factor).map(Money)
    }

    /// Integer division, flooring toward zero. Used for per-line slot bets.
    pub fn div_floor(self, divisor: u64) -> Money {
        if divisor == 0 {
            return Money::ZERO;
        }
        Money(self.0 / divisor)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_amount())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = f64::deserialize(deserializer)?;
        Money::from_amount(amount).map_err(|e| de::Error::custom(e.to_string()))
    }
}
