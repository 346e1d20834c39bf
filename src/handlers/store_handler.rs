//! Store Creation Handler

use sqlx::PgPool;

use crate::domain::{NewStore, OperationContext, Store};
use crate::error::AppError;
use crate::ledger::writes;

use super::CreateStoreCommand;

/// Handler for store creation
pub struct CreateStoreHandler {
    pool: PgPool,
}

impl CreateStoreHandler {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Execute the create store command
    pub async fn execute(
        &self,
        command: CreateStoreCommand,
        context: &OperationContext,
    ) -> Result<Store, AppError> {
        let new_store = NewStore::new(&command.name, command.budget.as_deref())?;

        let mut tx = self.pool.begin().await?;
        let store = writes::insert_store(&mut tx, new_store).await?;
        tx.commit().await?;

        tracing::info!(
            store_id = %store.id,
            budget = %store.budget,
            correlation_id = ?context.correlation_id,
            "Store created"
        );

        Ok(store)
    }
}
