//! Row shapes for the three ledger tables and their conversion into domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::{Amount, Budget, Car, CarSnapshot, Store, TransactionRecord};

pub(crate) const STORE_COLUMNS: &str = "id, name, budget";
pub(crate) const CAR_COLUMNS: &str = "id, make, model, price, store_id, submission_date";
pub(crate) const TRANSACTION_COLUMNS: &str =
    "id, car_make, car_model, buyer, seller, transaction_type, transaction_amount, transaction_date";

pub(crate) type StoreRow = (Uuid, String, Decimal);
pub(crate) type CarRow = (Uuid, String, String, Decimal, Uuid, DateTime<Utc>);
pub(crate) type TransactionRow = (
    Uuid,
    String,
    String,
    String,
    String,
    String,
    Decimal,
    DateTime<Utc>,
);

fn decode_error<E>(error: E) -> sqlx::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    sqlx::Error::Decode(Box::new(error))
}

pub(crate) fn store_from_row((id, name, budget): StoreRow) -> Store {
    Store {
        id,
        name,
        budget: Budget::from_decimal_unchecked(budget),
    }
}

pub(crate) fn car_from_row(
    (id, make, model, price, store_id, submission_date): CarRow,
) -> Result<Car, sqlx::Error> {
    Ok(Car {
        id,
        make,
        model,
        price: Amount::new(price).map_err(decode_error)?,
        store_id,
        submission_date,
    })
}

pub(crate) fn transaction_from_row(
    (id, car_make, car_model, buyer, seller, kind, amount, date): TransactionRow,
) -> Result<TransactionRecord, sqlx::Error> {
    Ok(TransactionRecord {
        id,
        car: CarSnapshot {
            make: car_make,
            model: car_model,
        },
        buyer,
        seller,
        transaction_type: kind.parse().map_err(decode_error)?,
        transaction_amount: amount,
        transaction_date: date,
    })
}
