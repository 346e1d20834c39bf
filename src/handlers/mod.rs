//! Command Handlers module
//!
//! The budget transfer handlers are the only code that changes a store's
//! budget or a car's lifecycle. Each runs as a single database transaction.

mod acquire_handler;
mod commands;
mod dispose_handler;
mod store_handler;


pub use acquire_handler::AcquireCarHandler;
pub use commands::*;
pub use dispose_handler::DisposeCarHandler;
pub use store_handler::CreateStoreHandler;
