//! Ledger module
//!
//! Persistence of stores, cars and the append-only transaction log.

mod recorder;
pub(crate) mod rows;
pub mod writes;

pub use recorder::TransactionRecorder;
