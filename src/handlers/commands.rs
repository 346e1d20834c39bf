//! Command definitions
//!
//! Commands represent intentions to change the system state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Command to open a new store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStoreCommand {
    pub name: String,
    /// Initial budget (as string for precise decimal); zero when absent
    pub budget: Option<String>,
}

impl CreateStoreCommand {
    pub fn new(name: String) -> Self {
        Self { name, budget: None }
    }

    pub fn with_budget(mut self, budget: String) -> Self {
        self.budget = Some(budget);
        self
    }
}

/// Command for a store to buy a newly submitted car
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireCarCommand {
    /// Store paying for the car
    pub store_id: Uuid,
    pub make: String,
    pub model: String,
    /// Price (as string for precise decimal)
    pub price: String,
}

impl AcquireCarCommand {
    pub fn new(store_id: Uuid, make: String, model: String, price: String) -> Self {
        Self {
            store_id,
            make,
            model,
            price,
        }
    }
}

/// Command to sell an owned car
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DisposeCarCommand {
    pub car_id: Uuid,
}

impl DisposeCarCommand {
    pub fn new(car_id: Uuid) -> Self {
        Self { car_id }
    }
}

/// Result of a successful sale
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisposeResult {
    pub car_id: Uuid,
    pub store_id: Uuid,
    pub amount_credited: Decimal,
    pub transaction_id: Uuid,
}
