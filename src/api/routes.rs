//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{
    Car, CarOrdering, OperationContext, Store, StoreWithCars, TransactionRecord,
    TransactionSummary,
};
use crate::error::AppError;
use crate::handlers::{
    AcquireCarCommand, AcquireCarHandler, CreateStoreCommand, CreateStoreHandler,
    DisposeCarCommand, DisposeCarHandler,
};
use crate::query::QueryService;

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Deserialize)]
pub struct CreateStoreRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "optional_decimal_text")]
    pub budget: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitCarRequest {
    pub store_id: Uuid,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, deserialize_with = "decimal_text")]
    pub price: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CarListQuery {
    #[serde(default)]
    pub ordering: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BuyCarResponse {
    pub car_id: Uuid,
    pub store_id: Uuid,
    pub amount_credited: Decimal,
    pub transaction_id: Uuid,
    pub message: String,
}

/// Money may arrive as a JSON string or a JSON number; both are kept as text
/// so precision checks see exactly what the caller sent.
fn decimal_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_decimal_text(deserializer)?.unwrap_or_default())
}

fn optional_decimal_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a decimal string or number, got {}",
            other
        ))),
    }
}

/// Malformed JSON bodies get the same error shape as every other failure
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<PgPool> {
    Router::new()
        .route("/", get(api_root))
        // Stores
        .route("/stores", get(list_stores).post(create_store))
        .route("/stores/:store_id", get(get_store))
        // Cars
        .route("/cars", get(list_cars))
        .route("/cars/submit", post(submit_car))
        .route("/cars/:car_id/buy", post(buy_car))
        // Transactions
        .route("/transactions", get(list_transactions))
        .route("/transactions/summary", get(transactions_summary))
}

// =========================================================================
// GET /
// =========================================================================

/// Route index
async fn api_root() -> Json<Value> {
    Json(json!({
        "stores": "/stores",
        "cars": "/cars",
        "submit_car": "/cars/submit",
        "buy_car": "/cars/:car_id/buy",
        "transactions": "/transactions",
        "transactions_summary": "/transactions/summary",
    }))
}

// =========================================================================
// Stores
// =========================================================================

async fn list_stores(State(pool): State<PgPool>) -> Result<Json<Vec<Store>>, AppError> {
    let stores = QueryService::new(pool).list_stores().await?;
    Ok(Json(stores))
}

async fn create_store(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<CreateStoreRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Store>), AppError> {
    let request = json_body(payload)?;
    let handler = CreateStoreHandler::new(pool);

    let command = CreateStoreCommand::new(request.name);
    let command = match request.budget {
        Some(budget) => command.with_budget(budget),
        None => command,
    };

    let store = handler.execute(command, &context).await?;

    Ok((StatusCode::CREATED, Json(store)))
}

async fn get_store(
    State(pool): State<PgPool>,
    Path(store_id): Path<Uuid>,
) -> Result<Json<StoreWithCars>, AppError> {
    let store = QueryService::new(pool).get_store_with_cars(store_id).await?;
    Ok(Json(store))
}

// =========================================================================
// Cars
// =========================================================================

/// List owned cars; `?ordering=-price` and friends
async fn list_cars(
    State(pool): State<PgPool>,
    Query(query): Query<CarListQuery>,
) -> Result<Json<Vec<Car>>, AppError> {
    let ordering = CarOrdering::parse(query.ordering.as_deref());
    let cars = QueryService::new(pool).list_cars(ordering).await?;
    Ok(Json(cars))
}

/// A store buys a newly submitted car
async fn submit_car(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    payload: Result<Json<SubmitCarRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Car>), AppError> {
    let request = json_body(payload)?;
    let handler = AcquireCarHandler::new(pool);

    let command =
        AcquireCarCommand::new(request.store_id, request.make, request.model, request.price);
    let car = handler.execute(command, &context).await?;

    Ok((StatusCode::CREATED, Json(car)))
}

/// The owning store sells the car
async fn buy_car(
    State(pool): State<PgPool>,
    Extension(context): Extension<OperationContext>,
    Path(car_id): Path<Uuid>,
) -> Result<Json<BuyCarResponse>, AppError> {
    let handler = DisposeCarHandler::new(pool);
    let result = handler.execute(DisposeCarCommand::new(car_id), &context).await?;

    Ok(Json(BuyCarResponse {
        car_id: result.car_id,
        store_id: result.store_id,
        amount_credited: result.amount_credited,
        transaction_id: result.transaction_id,
        message: "Car successfully purchased.".to_string(),
    }))
}

// =========================================================================
// Transactions
// =========================================================================

async fn list_transactions(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<TransactionRecord>>, AppError> {
    let transactions = QueryService::new(pool).list_transactions().await?;
    Ok(Json(transactions))
}

async fn transactions_summary(
    State(pool): State<PgPool>,
) -> Result<Json<TransactionSummary>, AppError> {
    let summary = QueryService::new(pool).transactions_summary().await?;
    Ok(Json(summary))
}
