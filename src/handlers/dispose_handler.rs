//! Dispose Handler
//!
//! A store sells one of its cars. The `sold` transaction, the budget credit
//! and the car deletion are written in one database transaction.

use sqlx::PgPool;

use crate::domain::OperationContext;
use crate::error::AppError;
use crate::ledger::{writes, TransactionRecorder};

use super::{DisposeCarCommand, DisposeResult};

/// Handler for car sales
pub struct DisposeCarHandler {
    recorder: TransactionRecorder,
    pool: PgPool,
}

impl DisposeCarHandler {
    pub fn new(pool: PgPool) -> Self {
        Self {
            recorder: TransactionRecorder::new(pool.clone()),
            pool,
        }
    }

    /// Execute the dispose command
    pub async fn execute(
        &self,
        command: DisposeCarCommand,
        context: &OperationContext,
    ) -> Result<DisposeResult, AppError> {
        let mut tx = self.pool.begin().await?;

        // Lock order is car, then store. A second sale of the same car waits
        // here and then finds no row.
        let car = writes::lock_car(&mut tx, command.car_id)
            .await?
            .ok_or(AppError::CarNotFound(command.car_id))?;

        let store = writes::lock_store(&mut tx, car.store_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal(format!(
                    "Car {} references missing store {}",
                    car.id, car.store_id
                ))
            })?;

        let transfer = store.dispose(&car).inspect_err(|e| {
            tracing::warn!(
                store_id = %store.id,
                car_id = %car.id,
                correlation_id = ?context.correlation_id,
                "Sale rejected: {}",
                e
            );
        })?;

        let record = self.recorder.append(&mut tx, &transfer.record).await?;
        writes::set_budget(&mut tx, store.id, transfer.new_budget).await?;
        writes::delete_car(&mut tx, car.id).await?;

        tx.commit().await?;

        tracing::info!(
            store_id = %store.id,
            car_id = %car.id,
            transaction_id = %record.id,
            amount = %car.price,
            budget = %transfer.new_budget,
            correlation_id = ?context.correlation_id,
            "Car sold"
        );

        Ok(DisposeResult {
            car_id: car.id,
            store_id: store.id,
            amount_credited: record.transaction_amount,
            transaction_id: record.id,
        })
    }
}
