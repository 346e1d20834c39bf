//! Car entity
//!
//! A car is owned by exactly one store from the moment it is acquired until
//! it is sold, at which point the row is deleted and only the transaction
//! snapshot remains.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::Amount;
use super::error::DomainError;
use super::transaction::CarSnapshot;
use super::validation::{into_result, required_amount, required_text};

/// Column width of `cars.make` and `cars.model`
pub const MAX_CAR_TEXT: usize = 50;

/// A car currently owned by a store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: Uuid,
    pub make: String,
    pub model: String,
    pub price: Amount,
    #[serde(rename = "store")]
    pub store_id: Uuid,
    pub submission_date: DateTime<Utc>,
}

impl Car {
    /// Copy the fields a transaction keeps after the car is gone
    pub fn snapshot(&self) -> CarSnapshot {
        CarSnapshot::new(&self.make, &self.model)
    }
}

/// A validated car submission, not yet owned by any store
#[derive(Debug, Clone, PartialEq)]
pub struct CarDraft {
    pub make: String,
    pub model: String,
    pub price: Amount,
}

impl CarDraft {
    /// Validate raw input. Every failing field is reported, not just the first.
    pub fn new(make: &str, model: &str, price: &str) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        let make = required_text("make", make, MAX_CAR_TEXT)
            .map_err(|e| errors.push(e))
            .ok();
        let model = required_text("model", model, MAX_CAR_TEXT)
            .map_err(|e| errors.push(e))
            .ok();
        let price = required_amount("price", price)
            .map_err(|e| errors.push(e))
            .ok();

        let draft = match (make, model, price) {
            (Some(make), Some(model), Some(price)) => Some(Self { make, model, price }),
            _ => None,
        };
        into_result(draft, errors)
    }

    pub fn snapshot(&self) -> CarSnapshot {
        CarSnapshot::new(&self.make, &self.model)
    }

    /// Attach the draft to its acquiring store
    pub fn into_car(self, store_id: Uuid, submission_date: DateTime<Utc>) -> Car {
        Car {
            id: Uuid::new_v4(),
            make: self.make,
            model: self.model,
            price: self.price,
            store_id,
            submission_date,
        }
    }
}

/// Sort order accepted by the car listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CarOrdering {
    #[default]
    PriceAsc,
    PriceDesc,
    MakeAsc,
    MakeDesc,
    ModelAsc,
    ModelDesc,
    SubmissionDateAsc,
    SubmissionDateDesc,
}

impl CarOrdering {
    /// Parse the `ordering` query value. Missing or unknown values fall back to price ascending.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("price") => Self::PriceAsc,
            Some("-price") => Self::PriceDesc,
            Some("make") => Self::MakeAsc,
            Some("-make") => Self::MakeDesc,
            Some("model") => Self::ModelAsc,
            Some("-model") => Self::ModelDesc,
            Some("submission_date") => Self::SubmissionDateAsc,
            Some("-submission_date") => Self::SubmissionDateDesc,
            _ => Self::default(),
        }
    }

    /// `ORDER BY` clause for the `cars` table. Only these static strings ever reach SQL.
    pub fn order_by_clause(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price ASC, submission_date ASC, id ASC",
            Self::PriceDesc => "price DESC, submission_date ASC, id ASC",
            Self::MakeAsc => "make ASC, submission_date ASC, id ASC",
            Self::MakeDesc => "make DESC, submission_date ASC, id ASC",
            Self::ModelAsc => "model ASC, submission_date ASC, id ASC",
            Self::ModelDesc => "model DESC, submission_date ASC, id ASC",
            Self::SubmissionDateAsc => "submission_date ASC, id ASC",
            Self::SubmissionDateDesc => "submission_date DESC, id ASC",
        }
    }
}
