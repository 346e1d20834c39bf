//! Transaction records
//!
//! Append-only audit trail of every budget-affecting event. A record carries
//! a snapshot of the car so it stays meaningful after the car row is deleted.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::amount::Amount;

/// Party name used for the outside counterparty of every transfer
pub const EXTERNAL_PARTY: &str = "User";

/// Direction of a transfer, seen from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// The store paid for a car
    Bought,
    /// The store was paid for a car
    Sold,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Bought => "bought",
            TransactionKind::Sold => "sold",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown transaction type: {0}")]
pub struct UnknownTransactionKind(pub String);

impl FromStr for TransactionKind {
    type Err = UnknownTransactionKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bought" => Ok(TransactionKind::Bought),
            "sold" => Ok(TransactionKind::Sold),
            other => Err(UnknownTransactionKind(other.to_string())),
        }
    }
}

/// Make and model copied from a car at the time of the transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarSnapshot {
    #[serde(rename = "car_make")]
    pub make: String,
    #[serde(rename = "car_model")]
    pub model: String,
}

impl CarSnapshot {
    pub fn new(make: &str, model: &str) -> Self {
        Self {
            make: make.to_string(),
            model: model.to_string(),
        }
    }
}

/// A transaction about to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub car: CarSnapshot,
    pub buyer: String,
    pub seller: String,
    pub kind: TransactionKind,
    pub amount: Amount,
}

impl NewTransaction {
    /// The store buys a car from the outside party
    pub fn bought(store_name: &str, car: CarSnapshot, amount: Amount) -> Self {
        Self {
            car,
            buyer: store_name.to_string(),
            seller: EXTERNAL_PARTY.to_string(),
            kind: TransactionKind::Bought,
            amount,
        }
    }

    /// The store sells a car to the outside party
    pub fn sold(store_name: &str, car: CarSnapshot, amount: Amount) -> Self {
        Self {
            car,
            buyer: EXTERNAL_PARTY.to_string(),
            seller: store_name.to_string(),
            kind: TransactionKind::Sold,
            amount,
        }
    }
}

/// A persisted, immutable transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    #[serde(flatten)]
    pub car: CarSnapshot,
    pub buyer: String,
    pub seller: String,
    pub transaction_type: TransactionKind,
    pub transaction_amount: Decimal,
    pub transaction_date: DateTime<Utc>,
}

impl fmt::Display for TransactionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {:.2} - {}",
            self.transaction_type,
            self.transaction_amount,
            self.transaction_date.to_rfc3339()
        )
    }
}

/// Aggregates over every transaction.
///
/// A metric that could not be computed is `None`; the others are still reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub total_bought_amount: Option<Decimal>,
    pub total_sold_amount: Option<Decimal>,
    pub total_transaction_count: Option<i64>,
    pub total_bought_transaction_count: Option<i64>,
    pub total_sold_transaction_count: Option<i64>,
}
