//! dealership Library
//!
//! Re-exports modules for integration testing and the binaries.

pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod handlers;
pub mod ledger;
pub mod query;

mod error;

pub use config::Config;
pub use domain::{Amount, AmountError, Budget, DomainError, OperationContext};
pub use error::{AppError, AppResult, ErrorKind, ErrorResponse};
