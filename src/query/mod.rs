//! Query module
//!
//! Read-only views over stores, cars and transactions. Nothing here writes.

mod service;

pub use service::QueryService;
