//! Domain module
//!
//! Ledger entities, money primitives and the transfer rules.

pub mod amount;
pub mod car;
pub mod context;
pub mod error;
pub mod store;
pub mod transaction;
mod validation;

pub use amount::{Amount, AmountError, Budget};
pub use car::{Car, CarDraft, CarOrdering};
pub use context::OperationContext;
pub use error::{DomainError, FieldError};
pub use store::{BudgetTransfer, NewStore, Store, StoreWithCars};
pub use transaction::{
    CarSnapshot, NewTransaction, TransactionKind, TransactionRecord, TransactionSummary,
    UnknownTransactionKind, EXTERNAL_PARTY,
};
