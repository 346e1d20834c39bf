//! Query Service
//!
//! Listings and lookups served straight from the ledger tables.

use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Car, CarOrdering, Store, StoreWithCars, TransactionRecord, TransactionSummary};
use crate::error::{AppError, AppResult};
use crate::ledger::rows::{car_from_row, store_from_row, CarRow, StoreRow, CAR_COLUMNS, STORE_COLUMNS};
use crate::ledger::TransactionRecorder;

/// Query Service for read endpoints
#[derive(Debug, Clone)]
pub struct QueryService {
    pool: PgPool,
    recorder: TransactionRecorder,
}

impl QueryService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            recorder: TransactionRecorder::new(pool.clone()),
            pool,
        }
    }

    /// All stores, by name
    pub async fn list_stores(&self) -> AppResult<Vec<Store>> {
        let rows: Vec<StoreRow> = sqlx::query_as(&format!(
            "SELECT {STORE_COLUMNS} FROM stores ORDER BY name, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(store_from_row).collect())
    }

    /// One store and the cars it owns, read from a single snapshot
    pub async fn get_store_with_cars(&self, store_id: Uuid) -> AppResult<StoreWithCars> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let row: Option<StoreRow> = sqlx::query_as(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"
        ))
        .bind(store_id)
        .fetch_optional(&mut *tx)
        .await?;

        let store = row
            .map(store_from_row)
            .ok_or(AppError::StoreNotFound(store_id))?;

        let rows: Vec<CarRow> = sqlx::query_as(&format!(
            "SELECT {CAR_COLUMNS} FROM cars WHERE store_id = $1 ORDER BY submission_date, id"
        ))
        .bind(store_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let cars = rows
            .into_iter()
            .map(car_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StoreWithCars { store, cars })
    }

    /// Every owned car in the requested order
    pub async fn list_cars(&self, ordering: CarOrdering) -> AppResult<Vec<Car>> {
        let rows: Vec<CarRow> = sqlx::query_as(&format!(
            "SELECT {CAR_COLUMNS} FROM cars ORDER BY {}",
            ordering.order_by_clause()
        ))
        .fetch_all(&self.pool)
        .await?;

        let cars = rows
            .into_iter()
            .map(car_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(cars)
    }

    pub async fn list_transactions(&self) -> AppResult<Vec<TransactionRecord>> {
        Ok(self.recorder.list().await?)
    }

    pub async fn transactions_summary(&self) -> AppResult<TransactionSummary> {
        Ok(self.recorder.summary().await?)
    }
}
