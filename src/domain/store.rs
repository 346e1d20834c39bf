//! Store entity
//!
//! A store holds a cash budget. The two transfer rules live here as pure
//! functions: each takes the current store state and returns the budget the
//! store must end up with plus the transaction that records the change. The
//! acquire and dispose handlers persist both in one database transaction.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::amount::{AmountError, Budget};
use super::car::{Car, CarDraft};
use super::error::DomainError;
use super::transaction::NewTransaction;
use super::validation::{into_result, optional_budget, required_text};

/// Column width of `stores.name`
pub const MAX_STORE_NAME: usize = 100;

/// A budget-holding store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub budget: Budget,
}

/// Outcome of a transfer rule, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetTransfer {
    pub new_budget: Budget,
    pub record: NewTransaction,
}

impl Store {
    /// Pay for a submitted car.
    ///
    /// # Errors
    /// - `DomainError::InsufficientBudget` if the price exceeds the budget
    pub fn acquire(&self, draft: &CarDraft) -> Result<BudgetTransfer, DomainError> {
        if !self.budget.is_sufficient_for(&draft.price) {
            return Err(DomainError::insufficient_budget(
                draft.price.value(),
                self.budget.value(),
            ));
        }

        let new_budget = self.budget.debit(&draft.price).map_err(|e| match e {
            AmountError::Negative(_) => {
                DomainError::insufficient_budget(draft.price.value(), self.budget.value())
            }
            _ => DomainError::BudgetOverflow {
                available: self.budget.value(),
                change: draft.price.value(),
            },
        })?;

        Ok(BudgetTransfer {
            new_budget,
            record: NewTransaction::bought(&self.name, draft.snapshot(), draft.price),
        })
    }

    /// Sell an owned car back out, crediting its price.
    ///
    /// # Errors
    /// - `DomainError::BudgetOverflow` if the credited budget would not fit the column
    pub fn dispose(&self, car: &Car) -> Result<BudgetTransfer, DomainError> {
        let new_budget = self
            .budget
            .credit(&car.price)
            .map_err(|_| DomainError::BudgetOverflow {
                available: self.budget.value(),
                change: car.price.value(),
            })?;

        Ok(BudgetTransfer {
            new_budget,
            record: NewTransaction::sold(&self.name, car.snapshot(), car.price),
        })
    }
}

/// A validated store creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NewStore {
    pub name: String,
    pub budget: Budget,
}

impl NewStore {
    /// Validate raw input. A missing budget starts the store at zero.
    pub fn new(name: &str, budget: Option<&str>) -> Result<Self, DomainError> {
        let mut errors = Vec::new();

        let name = required_text("name", name, MAX_STORE_NAME)
            .map_err(|e| errors.push(e))
            .ok();
        let budget = optional_budget("budget", budget)
            .map_err(|e| errors.push(e))
            .ok();

        let store = match (name, budget) {
            (Some(name), Some(budget)) => Some(Self { name, budget }),
            _ => None,
        };
        into_result(store, errors)
    }

    pub fn into_store(self) -> Store {
        Store {
            id: Uuid::new_v4(),
            name: self.name,
            budget: self.budget,
        }
    }
}

/// A store together with every car it currently owns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreWithCars {
    pub store: Store,
    pub cars: Vec<Car>,
}
