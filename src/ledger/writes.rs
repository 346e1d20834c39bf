//! Row-level reads and writes used inside a budget transfer.
//!
//! Every function takes the caller's open database transaction; none of them
//! commits. The `FOR UPDATE` reads hold row locks until the caller commits or
//! rolls back.

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::domain::{Budget, Car, NewStore, Store};

use super::rows::{car_from_row, store_from_row, CarRow, StoreRow, CAR_COLUMNS, STORE_COLUMNS};

/// Read a store and lock its row against concurrent transfers
pub async fn lock_store(
    tx: &mut Transaction<'_, Postgres>,
    store_id: Uuid,
) -> Result<Option<Store>, sqlx::Error> {
    let row: Option<StoreRow> = sqlx::query_as(&format!(
        "SELECT {STORE_COLUMNS} FROM stores WHERE id = $1 FOR UPDATE"
    ))
    .bind(store_id)
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(store_from_row))
}

/// Read a car and lock its row so it can only be sold once
pub async fn lock_car(
    tx: &mut Transaction<'_, Postgres>,
    car_id: Uuid,
) -> Result<Option<Car>, sqlx::Error> {
    let row: Option<CarRow> = sqlx::query_as(&format!(
        "SELECT {CAR_COLUMNS} FROM cars WHERE id = $1 FOR UPDATE"
    ))
    .bind(car_id)
    .fetch_optional(&mut **tx)
    .await?;

    row.map(car_from_row).transpose()
}

pub async fn insert_store(
    tx: &mut Transaction<'_, Postgres>,
    store: NewStore,
) -> Result<Store, sqlx::Error> {
    let store = store.into_store();

    let row: StoreRow = sqlx::query_as(&format!(
        "INSERT INTO stores (id, name, budget) VALUES ($1, $2, $3) RETURNING {STORE_COLUMNS}"
    ))
    .bind(store.id)
    .bind(&store.name)
    .bind(store.budget.value())
    .fetch_one(&mut **tx)
    .await?;

    Ok(store_from_row(row))
}

/// Insert a car; the stored row is returned so prices carry the column's scale
pub async fn insert_car(tx: &mut Transaction<'_, Postgres>, car: &Car) -> Result<Car, sqlx::Error> {
    let row: CarRow = sqlx::query_as(&format!(
        r#"
        INSERT INTO cars (id, store_id, make, model, price, submission_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {CAR_COLUMNS}
        "#
    ))
    .bind(car.id)
    .bind(car.store_id)
    .bind(&car.make)
    .bind(&car.model)
    .bind(car.price.value())
    .bind(car.submission_date)
    .fetch_one(&mut **tx)
    .await?;

    car_from_row(row)
}

/// Overwrite a locked store's budget
pub async fn set_budget(
    tx: &mut Transaction<'_, Postgres>,
    store_id: Uuid,
    budget: Budget,
) -> Result<(), sqlx::Error> {
    let rows_affected = sqlx::query("UPDATE stores SET budget = $2 WHERE id = $1")
        .bind(store_id)
        .bind(budget.value())
        .execute(&mut **tx)
        .await?
        .rows_affected();

    if rows_affected != 1 {
        return Err(sqlx::Error::RowNotFound);
    }

    Ok(())
}

pub async fn delete_car(tx: &mut Transaction<'_, Postgres>, car_id: Uuid) -> Result<(), sqlx::Error> {
    let rows_affected = sqlx::query("DELETE FROM cars WHERE id = $1")
        .bind(car_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

    if rows_affected != 1 {
        return Err(sqlx::Error::RowNotFound);
    }

    Ok(())
}
