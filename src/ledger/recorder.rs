//! Transaction Recorder
//!
//! Appends immutable transaction records and computes the reporting
//! aggregates over them.

use sqlx::postgres::PgRow;
use sqlx::{Acquire, FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{NewTransaction, TransactionKind, TransactionRecord, TransactionSummary};

use super::rows::{transaction_from_row, TransactionRow, TRANSACTION_COLUMNS};

const SUM_BY_KIND: &str = "SELECT COALESCE(SUM(transaction_amount), 0) FROM transactions WHERE transaction_type = $1";
const COUNT_ALL: &str = "SELECT COUNT(*) FROM transactions";
const COUNT_BY_KIND: &str = "SELECT COUNT(*) FROM transactions WHERE transaction_type = $1";

/// Recorder for the `transactions` table
#[derive(Debug, Clone)]
pub struct TransactionRecorder {
    pool: PgPool,
}

impl TransactionRecorder {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append a record inside the caller's database transaction.
    /// The row becomes visible only if that transaction commits.
    pub async fn append(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: &NewTransaction,
    ) -> Result<TransactionRecord, sqlx::Error> {
        let row: TransactionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO transactions (
                id, car_make, car_model, buyer, seller,
                transaction_type, transaction_amount
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&entry.car.make)
        .bind(&entry.car.model)
        .bind(&entry.buyer)
        .bind(&entry.seller)
        .bind(entry.kind.as_str())
        .bind(entry.amount.value())
        .fetch_one(&mut **tx)
        .await?;

        let record = transaction_from_row(row)?;

        tracing::debug!(transaction_id = %record.id, "Recorded transaction {}", record);

        Ok(record)
    }

    /// All transactions in chronological order
    pub async fn list(&self) -> Result<Vec<TransactionRecord>, sqlx::Error> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions ORDER BY transaction_date, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(transaction_from_row).collect()
    }

    /// Compute the five reporting aggregates against one snapshot.
    ///
    /// Each metric runs under its own savepoint, so a failing metric is
    /// reported as `None` without aborting the others.
    pub async fn summary(&self) -> Result<TransactionSummary, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let summary = TransactionSummary {
            total_bought_amount: metric(
                &mut tx,
                "total_bought_amount",
                SUM_BY_KIND,
                Some(TransactionKind::Bought),
            )
            .await,
            total_sold_amount: metric(
                &mut tx,
                "total_sold_amount",
                SUM_BY_KIND,
                Some(TransactionKind::Sold),
            )
            .await,
            total_transaction_count: metric(&mut tx, "total_transaction_count", COUNT_ALL, None)
                .await,
            total_bought_transaction_count: metric(
                &mut tx,
                "total_bought_transaction_count",
                COUNT_BY_KIND,
                Some(TransactionKind::Bought),
            )
            .await,
            total_sold_transaction_count: metric(
                &mut tx,
                "total_sold_transaction_count",
                COUNT_BY_KIND,
                Some(TransactionKind::Sold),
            )
            .await,
        };

        tx.commit().await?;

        Ok(summary)
    }
}

/// Run one scalar aggregate under a savepoint
async fn metric<T>(
    tx: &mut Transaction<'_, Postgres>,
    name: &'static str,
    sql: &'static str,
    kind: Option<TransactionKind>,
) -> Option<T>
where
    T: Send + Unpin,
    (T,): for<'r> FromRow<'r, PgRow>,
{
    let result: Result<T, sqlx::Error> = async {
        let mut savepoint = tx.begin().await?;

        let mut query = sqlx::query_scalar::<Postgres, T>(sql);
        if let Some(kind) = kind {
            query = query.bind(kind.as_str());
        }
        let value = query.fetch_one(&mut *savepoint).await?;

        savepoint.commit().await?;
        Ok(value)
    }
    .await;

    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::error!(metric = name, error = %e, "Failed to compute transaction metric");
            None
        }
    }
}
