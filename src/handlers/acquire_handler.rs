//! Acquire Handler
//!
//! A store buys a newly submitted car. The car insert, the budget debit and
//! the `bought` transaction are written in one database transaction.

use chrono::{SubsecRound, Utc};
use sqlx::PgPool;

use crate::domain::{Car, CarDraft, OperationContext};
use crate::error::AppError;
use crate::ledger::{writes, TransactionRecorder};

use super::AcquireCarCommand;

/// Handler for car acquisitions
pub struct AcquireCarHandler {
    recorder: TransactionRecorder,
    pool: PgPool,
}

impl AcquireCarHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            recorder: TransactionRecorder::new(pool.clone()),
            pool,
        }
    }

    /// Execute the acquire command
    pub async fn execute(
        &self,
        command: AcquireCarCommand,
        context: &OperationContext,
    ) -> Result<Car, AppError> {
        let draft = CarDraft::new(&command.make, &command.model, &command.price)?;

        // Dropping `tx` on any early return rolls everything back
        let mut tx = self.pool.begin().await?;

        // The row lock makes concurrent acquisitions see each other's debits
        let store = writes::lock_store(&mut tx, command.store_id)
            .await?
            .ok_or(AppError::StoreNotFound(command.store_id))?;

        let transfer = store.acquire(&draft).inspect_err(|e| {
            tracing::warn!(
                store_id = %store.id,
                price = %draft.price,
                budget = %store.budget,
                correlation_id = ?context.correlation_id,
                "Acquisition rejected: {}",
                e
            );
        })?;

        // Postgres keeps microseconds
        let car = draft.into_car(store.id, Utc::now().trunc_subsecs(6));
        let car = writes::insert_car(&mut tx, &car).await?;
        writes::set_budget(&mut tx, store.id, transfer.new_budget).await?;
        let record = self.recorder.append(&mut tx, &transfer.record).await?;

        tx.commit().await?;

        tracing::info!(
            store_id = %store.id,
            car_id = %car.id,
            transaction_id = %record.id,
            amount = %car.price,
            budget = %transfer.new_budget,
            correlation_id = ?context.correlation_id,
            "Car acquired"
        );

        Ok(car)
    }
}
