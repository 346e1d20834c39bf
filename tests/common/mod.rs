//! Common test utilities
//!
//! Every test gets a fresh Postgres schema with the migrations applied, so
//! tests can run in parallel against one database. Tests are skipped when
//! `DATABASE_URL` is not set.
//!
//! Schemas are named `test_<unix seconds>_<uuid>`. A test cannot drop its own
//! schema reliably (it may panic first), so each setup drops the schemas left
//! behind by runs older than `STALE_SCHEMA_SECS`.

#![allow(dead_code)]

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use dealership::domain::{Car, OperationContext, Store};
use dealership::handlers::{
    AcquireCarCommand, AcquireCarHandler, CreateStoreCommand, CreateStoreHandler,
};

/// Test schemas older than this are dropped on the next setup
const STALE_SCHEMA_SECS: i64 = 3600;

/// Connect to an isolated, freshly migrated schema
pub async fn test_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping database test");
        return None;
    };

    let now = Utc::now().timestamp();
    let schema = format!("test_{}_{}", now, Uuid::new_v4().simple());

    let admin = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");
    drop_stale_schemas(&admin, now).await;
    admin
        .execute(format!("CREATE SCHEMA {schema}").as_str())
        .await
        .expect("Failed to create test schema");
    admin.close().await;

    let search_path = format!("SET search_path TO {schema}");
    let pool = PgPoolOptions::new()
        .max_connections(20)
        .after_connect(move |conn, _meta| {
            let search_path = search_path.clone();
            Box::pin(async move {
                conn.execute(search_path.as_str()).await?;
                Ok(())
            })
        })
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    dealership::db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

async fn drop_stale_schemas(admin: &PgPool, now: i64) {
    let schemas: Vec<String> =
        sqlx::query_scalar(r"SELECT nspname::TEXT FROM pg_namespace WHERE nspname LIKE 'test\_%'")
            .fetch_all(admin)
            .await
            .expect("Failed to list test schemas");

    for schema in schemas {
        let created = schema
            .split('_')
            .nth(1)
            .and_then(|secs| secs.parse::<i64>().ok());

        if matches!(created, Some(secs) if now - secs > STALE_SCHEMA_SECS) {
            // Another run may be dropping the same schema
            let _ = admin
                .execute(format!("DROP SCHEMA IF EXISTS {schema} CASCADE").as_str())
                .await;
        }
    }
}

pub async fn create_store(pool: &PgPool, name: &str, budget: &str) -> Store {
    CreateStoreHandler::new(pool.clone())
        .execute(
            CreateStoreCommand::new(name.to_string()).with_budget(budget.to_string()),
            &OperationContext::new(),
        )
        .await
        .expect("Failed to create store")
}

pub async fn acquire(pool: &PgPool, store_id: Uuid, model: &str, price: &str) -> Car {
    AcquireCarHandler::new(pool.clone())
        .execute(
            AcquireCarCommand::new(
                store_id,
                "Test Make".to_string(),
                model.to_string(),
                price.to_string(),
            ),
            &OperationContext::new(),
        )
        .await
        .expect("Failed to acquire car")
}

pub async fn budget_of(pool: &PgPool, store_id: Uuid) -> Decimal {
    sqlx::query_scalar("SELECT budget FROM stores WHERE id = $1")
        .bind(store_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read budget")
}

pub async fn count(pool: &PgPool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}
