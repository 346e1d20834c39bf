//! Money types
//!
//! Domain primitives for car prices, transaction amounts and store budgets.
//! Values are validated at construction time so an out-of-range price can
//! never reach the database.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest value a `NUMERIC(10,2)` column can hold: 9_999_999_999 cents,
/// split into the low and mid 32-bit words.
const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Maximum decimal places (cents)
const MAX_SCALE: u32 = 2;

/// Amount represents a validated, strictly positive sum of money.
///
/// Used for car prices and transaction amounts.
///
/// # Invariants
/// - Value is always positive (> 0)
/// - At most 2 significant decimal places
/// - At most 99,999,999.99
///
/// # Example
/// ```
/// use rust_decimal::Decimal;
/// use dealership::domain::Amount;
///
/// let amount = Amount::new(Decimal::new(2500000, 2)).unwrap();
/// assert_eq!(amount.value(), Decimal::new(25000, 0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

/// Errors that can occur when creating an Amount or a Budget
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountError {
    #[error("Amount must be positive (got {0})")]
    NotPositive(Decimal),

    #[error("Amount must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Amount has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Amount exceeds maximum allowed value ({MAX_AMOUNT})")]
    Overflow,

    #[error("Invalid amount format: {0}")]
    ParseError(String),
}

fn check_range(value: Decimal) -> Result<Decimal, AmountError> {
    let scale = value.normalize().scale();
    if scale > MAX_SCALE {
        return Err(AmountError::TooManyDecimals(scale));
    }

    if value > MAX_AMOUNT {
        return Err(AmountError::Overflow);
    }

    Ok(value)
}

impl Amount {
    /// Create a new Amount with validation.
    ///
    /// # Errors
    /// - `AmountError::NotPositive` if value <= 0
    /// - `AmountError::TooManyDecimals` if more than 2 significant decimal places
    /// - `AmountError::Overflow` if value > 99,999,999.99
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value <= Decimal::ZERO {
            return Err(AmountError::NotPositive(value));
        }

        check_range(value).map(Self)
    }

    /// Create an Amount from an integer (no decimal places).
    pub fn from_integer(value: i64) -> Result<Self, AmountError> {
        Self::new(Decimal::from(value))
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        Amount::new(decimal)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Budget represents the cash a store holds (zero or positive).
/// Unlike Amount, Budget can be zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Budget(Decimal);

impl Budget {
    /// Create a new budget (zero or positive)
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value < Decimal::ZERO {
            return Err(AmountError::Negative(value));
        }

        check_range(value).map(Self)
    }

    /// Create a zero budget
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Wrap a budget read back from the database without validation.
    /// The column is not constrained, so rows edited by hand may hold any value.
    pub fn from_decimal_unchecked(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the underlying value
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check if the budget covers the given price
    pub fn is_sufficient_for(&self, amount: &Amount) -> bool {
        self.0 >= amount.value()
    }

    /// Add amount to budget. Only the column ceiling applies; a budget that is
    /// already negative may still be credited.
    pub fn credit(&self, amount: &Amount) -> Result<Budget, AmountError> {
        let value = self.0 + amount.value();
        if value > MAX_AMOUNT {
            return Err(AmountError::Overflow);
        }
        Ok(Self(value))
    }

    /// Subtract amount from budget
    pub fn debit(&self, amount: &Amount) -> Result<Budget, AmountError> {
        Budget::new(self.0 - amount.value())
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Budget {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim())
            .map_err(|e| AmountError::ParseError(e.to_string()))?;
        Budget::new(decimal)
    }
}

impl TryFrom<Decimal> for Budget {
    type Error = AmountError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Budget::new(value)
    }
}

impl From<Budget> for Decimal {
    fn from(budget: Budget) -> Self {
        budget.0
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::zero()
    }
}
