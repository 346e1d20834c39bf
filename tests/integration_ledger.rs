//! Budget transfer and query integration tests

use rust_decimal_macros::dec;
use uuid::Uuid;

use dealership::domain::{
    CarOrdering, CarSnapshot, DomainError, NewTransaction, OperationContext, TransactionKind,
    EXTERNAL_PARTY,
};
use dealership::handlers::{
    AcquireCarCommand, AcquireCarHandler, CreateStoreCommand, CreateStoreHandler,
    DisposeCarCommand, DisposeCarHandler,
};
use dealership::ledger::TransactionRecorder;
use dealership::query::QueryService;
use dealership::{Amount, AppError, ErrorKind};

mod common;

fn acquire_command(store_id: Uuid, price: &str) -> AcquireCarCommand {
    AcquireCarCommand::new(
        store_id,
        "Test Make".to_string(),
        "Test Model".to_string(),
        price.to_string(),
    )
}

// =========================================================================
// Acquire
// =========================================================================

#[tokio::test]
async fn test_acquire_debits_budget_and_records_purchase() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "10000").await;

    let car = AcquireCarHandler::new(pool.clone())
        .execute(acquire_command(store.id, "1000"), &OperationContext::new())
        .await
        .unwrap();

    assert_eq!(car.store_id, store.id);
    assert_eq!(car.price.value(), dec!(1000));
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(9000));

    let transactions = QueryService::new(pool.clone()).list_transactions().await.unwrap();
    assert_eq!(transactions.len(), 1);
    let record = &transactions[0];
    assert_eq!(record.transaction_type, TransactionKind::Bought);
    assert_eq!(record.buyer, "Test Store");
    assert_eq!(record.seller, EXTERNAL_PARTY);
    assert_eq!(record.transaction_amount, dec!(1000));
    assert_eq!(record.car, CarSnapshot::new("Test Make", "Test Model"));
}

#[tokio::test]
async fn test_acquire_exact_budget_leaves_zero() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "5000.00").await;

    common::acquire(&pool, store.id, "Exact", "5000.00").await;

    assert_eq!(common::budget_of(&pool, store.id).await, dec!(0));
}

#[tokio::test]
async fn test_acquire_over_budget_changes_nothing() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "5000.00").await;

    let result = AcquireCarHandler::new(pool.clone())
        .execute(acquire_command(store.id, "5000.01"), &OperationContext::new())
        .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::InsufficientBudget { .. }))
    ));
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(5000.00));
    assert_eq!(common::count(&pool, "cars").await, 0);
    assert_eq!(common::count(&pool, "transactions").await, 0);
}

#[tokio::test]
async fn test_acquire_invalid_draft_changes_nothing() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "5000").await;

    let result = AcquireCarHandler::new(pool.clone())
        .execute(acquire_command(store.id, "-5"), &OperationContext::new())
        .await;

    assert!(matches!(
        result,
        Err(AppError::Domain(DomainError::InvalidFields(_)))
    ));
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(5000));
    assert_eq!(common::count(&pool, "cars").await, 0);
}

#[tokio::test]
async fn test_acquire_unknown_store() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let missing = Uuid::new_v4();

    let result = AcquireCarHandler::new(pool.clone())
        .execute(acquire_command(missing, "1000"), &OperationContext::new())
        .await;

    assert!(matches!(result, Err(AppError::StoreNotFound(id)) if id == missing));
    assert_eq!(common::count(&pool, "transactions").await, 0);
}

#[tokio::test]
async fn test_concurrent_acquisitions_never_overdraw() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Busy Store", "10000").await;

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let handler = AcquireCarHandler::new(pool.clone());
            let command = acquire_command(store.id, "3000");
            tokio::spawn(async move { handler.execute(command, &OperationContext::new()).await })
        })
        .collect();

    let mut succeeded = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(AppError::Domain(DomainError::InsufficientBudget { .. })) => {}
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    assert_eq!(succeeded, 3);
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(1000));
    assert_eq!(common::count(&pool, "cars").await, 3);
    assert_eq!(common::count(&pool, "transactions").await, 3);
}

#[tokio::test]
async fn test_two_concurrent_acquisitions_exceeding_budget() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "10000").await;

    let first = AcquireCarHandler::new(pool.clone());
    let second = AcquireCarHandler::new(pool.clone());
    let context = OperationContext::new();

    let (a, b) = tokio::join!(
        first.execute(acquire_command(store.id, "6000"), &context),
        second.execute(acquire_command(store.id, "7000"), &context),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let budget = common::budget_of(&pool, store.id).await;
    assert!(budget == dec!(4000) || budget == dec!(3000));
}

// =========================================================================
// Dispose
// =========================================================================

#[tokio::test]
async fn test_dispose_credits_budget_and_removes_car() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "25000").await;
    let car = common::acquire(&pool, store.id, "Seller", "5000.00").await;
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(20000));

    let result = DisposeCarHandler::new(pool.clone())
        .execute(DisposeCarCommand::new(car.id), &OperationContext::new())
        .await
        .unwrap();

    assert_eq!(result.car_id, car.id);
    assert_eq!(result.store_id, store.id);
    assert_eq!(result.amount_credited, dec!(5000.00));
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(25000));
    assert_eq!(common::count(&pool, "cars").await, 0);

    let transactions = QueryService::new(pool.clone()).list_transactions().await.unwrap();
    let sold: Vec<_> = transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionKind::Sold)
        .collect();
    assert_eq!(sold.len(), 1);
    assert_eq!(sold[0].id, result.transaction_id);
    assert_eq!(sold[0].buyer, EXTERNAL_PARTY);
    assert_eq!(sold[0].seller, "Test Store");
    assert_eq!(sold[0].car.model, "Seller");
}

#[tokio::test]
async fn test_dispose_twice_is_not_found() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "10000").await;
    let car = common::acquire(&pool, store.id, "Once", "1000").await;
    let handler = DisposeCarHandler::new(pool.clone());

    handler
        .execute(DisposeCarCommand::new(car.id), &OperationContext::new())
        .await
        .unwrap();
    let budget = common::budget_of(&pool, store.id).await;

    let second = handler
        .execute(DisposeCarCommand::new(car.id), &OperationContext::new())
        .await;

    assert!(matches!(second, Err(AppError::CarNotFound(id)) if id == car.id));
    assert_eq!(common::budget_of(&pool, store.id).await, budget);
    assert_eq!(common::count(&pool, "transactions").await, 2);
}

#[tokio::test]
async fn test_concurrent_disposals_sell_once() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "10000").await;
    let car = common::acquire(&pool, store.id, "Contested", "2500").await;

    let first = DisposeCarHandler::new(pool.clone());
    let second = DisposeCarHandler::new(pool.clone());
    let context = OperationContext::new();

    let (a, b) = tokio::join!(
        first.execute(DisposeCarCommand::new(car.id), &context),
        second.execute(DisposeCarCommand::new(car.id), &context),
    );

    assert_eq!([a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count(), 1);
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(10000));
}

// =========================================================================
// Atomicity
// =========================================================================

/// Make every write of `event` on `table` fail inside the database
async fn refuse_writes(pool: &sqlx::PgPool, event: &str, table: &str) {
    sqlx::query(
        "CREATE OR REPLACE FUNCTION refuse_write() RETURNS TRIGGER AS $$ \
         BEGIN RAISE EXCEPTION 'write refused'; END; $$ LANGUAGE plpgsql",
    )
    .execute(pool)
    .await
    .unwrap();

    sqlx::query(&format!(
        "CREATE TRIGGER refuse_{table} BEFORE {event} ON {table} \
         FOR EACH ROW EXECUTE FUNCTION refuse_write()"
    ))
    .execute(pool)
    .await
    .unwrap();
}

#[tokio::test]
async fn test_acquire_failing_last_write_rolls_back() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "10000").await;

    // The ledger append is the last write of an acquisition
    refuse_writes(&pool, "INSERT", "transactions").await;

    let result = AcquireCarHandler::new(pool.clone())
        .execute(acquire_command(store.id, "1000"), &OperationContext::new())
        .await;

    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Persistence);
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(10000));
    assert_eq!(common::count(&pool, "cars").await, 0);
    assert_eq!(common::count(&pool, "transactions").await, 0);
}

#[tokio::test]
async fn test_dispose_failing_last_write_rolls_back() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "10000").await;
    let car = common::acquire(&pool, store.id, "Stuck", "2500").await;

    // The car deletion runs after the sold record and the budget credit
    refuse_writes(&pool, "DELETE", "cars").await;

    let result = DisposeCarHandler::new(pool.clone())
        .execute(DisposeCarCommand::new(car.id), &OperationContext::new())
        .await;

    let error = result.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Persistence);
    assert_eq!(common::budget_of(&pool, store.id).await, dec!(7500));
    assert_eq!(common::count(&pool, "cars").await, 1);
    assert_eq!(common::count(&pool, "transactions").await, 1);
}

// =========================================================================
// Queries
// =========================================================================

#[tokio::test]
async fn test_summary_over_recorded_transactions() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let recorder = TransactionRecorder::new(pool.clone());
    let snapshot = CarSnapshot::new("Test Make", "Test Model");

    let mut tx = pool.begin().await.unwrap();
    for (kind, amount) in [
        (TransactionKind::Bought, 5000),
        (TransactionKind::Bought, 7500),
        (TransactionKind::Sold, 6000),
        (TransactionKind::Sold, 3000),
    ] {
        let amount = Amount::from_integer(amount).unwrap();
        let entry = match kind {
            TransactionKind::Bought => NewTransaction::bought("Test Store", snapshot.clone(), amount),
            TransactionKind::Sold => NewTransaction::sold("Test Store", snapshot.clone(), amount),
        };
        recorder.append(&mut tx, &entry).await.unwrap();
    }
    tx.commit().await.unwrap();

    let summary = QueryService::new(pool).transactions_summary().await.unwrap();

    assert_eq!(summary.total_bought_amount, Some(dec!(12500)));
    assert_eq!(summary.total_sold_amount, Some(dec!(9000)));
    assert_eq!(summary.total_transaction_count, Some(4));
    assert_eq!(summary.total_bought_transaction_count, Some(2));
    assert_eq!(summary.total_sold_transaction_count, Some(2));
}

#[tokio::test]
async fn test_summary_of_empty_ledger_is_zero() {
    let Some(pool) = common::test_pool().await else {
        return;
    };

    let summary = QueryService::new(pool).transactions_summary().await.unwrap();

    assert_eq!(summary.total_bought_amount, Some(dec!(0)));
    assert_eq!(summary.total_sold_amount, Some(dec!(0)));
    assert_eq!(summary.total_transaction_count, Some(0));
}

#[tokio::test]
async fn test_summary_reports_metrics_that_still_work() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "10000").await;
    let car = common::acquire(&pool, store.id, "Counted", "1000").await;
    DisposeCarHandler::new(pool.clone())
        .execute(DisposeCarCommand::new(car.id), &OperationContext::new())
        .await
        .unwrap();

    // Amount sums can no longer be computed; the counts still can
    sqlx::query("ALTER TABLE transactions DROP CONSTRAINT transactions_transaction_amount_check")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "ALTER TABLE transactions ALTER COLUMN transaction_amount TYPE TEXT \
         USING transaction_amount::TEXT",
    )
    .execute(&pool)
    .await
    .unwrap();

    let summary = QueryService::new(pool).transactions_summary().await.unwrap();

    assert_eq!(summary.total_bought_amount, None);
    assert_eq!(summary.total_sold_amount, None);
    assert_eq!(summary.total_transaction_count, Some(2));
    assert_eq!(summary.total_bought_transaction_count, Some(1));
    assert_eq!(summary.total_sold_transaction_count, Some(1));
}

#[tokio::test]
async fn test_transactions_are_append_only() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "10000").await;
    common::acquire(&pool, store.id, "Audit", "1000").await;

    let update = sqlx::query("UPDATE transactions SET transaction_amount = 1")
        .execute(&pool)
        .await;
    let delete = sqlx::query("DELETE FROM transactions").execute(&pool).await;

    assert!(update.is_err());
    assert!(delete.is_err());
    assert_eq!(common::count(&pool, "transactions").await, 1);
}

#[tokio::test]
async fn test_list_cars_ordering() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let store = common::create_store(&pool, "Test Store", "100000").await;
    for price in ["5000", "7500", "6000"] {
        common::acquire(&pool, store.id, price, price).await;
    }
    let queries = QueryService::new(pool);

    let prices = |cars: Vec<dealership::domain::Car>| -> Vec<_> {
        cars.into_iter().map(|c| c.price.value()).collect()
    };

    let by_price_desc = queries.list_cars(CarOrdering::parse(Some("-price"))).await.unwrap();
    assert_eq!(prices(by_price_desc), vec![dec!(7500), dec!(6000), dec!(5000)]);

    let default = queries.list_cars(CarOrdering::parse(None)).await.unwrap();
    assert_eq!(prices(default), vec![dec!(5000), dec!(6000), dec!(7500)]);

    let invalid = queries.list_cars(CarOrdering::parse(Some("colour"))).await.unwrap();
    assert_eq!(prices(invalid), vec![dec!(5000), dec!(6000), dec!(7500)]);

    let submitted = queries
        .list_cars(CarOrdering::parse(Some("submission_date")))
        .await
        .unwrap();
    assert_eq!(prices(submitted), vec![dec!(5000), dec!(7500), dec!(6000)]);
}

#[tokio::test]
async fn test_store_with_cars_and_store_listing() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let zeta = common::create_store(&pool, "Zeta Motors", "10000").await;
    let alpha = common::create_store(&pool, "Alpha Autos", "10000").await;
    let car = common::acquire(&pool, alpha.id, "Owned", "1500").await;
    let queries = QueryService::new(pool.clone());

    let stores = queries.list_stores().await.unwrap();
    let ids: Vec<_> = stores.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![alpha.id, zeta.id]);

    let view = queries.get_store_with_cars(alpha.id).await.unwrap();
    assert_eq!(view.store.budget.value(), dec!(8500));
    assert_eq!(view.cars.len(), 1);
    assert_eq!(view.cars[0].id, car.id);

    let empty = queries.get_store_with_cars(zeta.id).await.unwrap();
    assert!(empty.cars.is_empty());

    let missing = Uuid::new_v4();
    let result = queries.get_store_with_cars(missing).await;
    assert!(matches!(result, Err(AppError::StoreNotFound(id)) if id == missing));
}

#[tokio::test]
async fn test_create_store_validation() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let handler = CreateStoreHandler::new(pool.clone());

    let store = handler
        .execute(
            CreateStoreCommand::new("No Budget".to_string()),
            &OperationContext::new(),
        )
        .await
        .unwrap();
    assert_eq!(store.budget.value(), dec!(0));

    let result = handler
        .execute(
            CreateStoreCommand::new("   ".to_string()).with_budget("10.001".to_string()),
            &OperationContext::new(),
        )
        .await;
    match result {
        Err(AppError::Domain(DomainError::InvalidFields(fields))) => assert_eq!(fields.len(), 2),
        other => panic!("Expected InvalidFields, got: {:?}", other),
    }
    assert_eq!(common::count(&pool, "stores").await, 1);
}

#[tokio::test]
async fn test_setup_drops_stale_test_schemas() {
    let Some(pool) = common::test_pool().await else {
        return;
    };
    let stale = format!("test_1000_{}", Uuid::new_v4().simple());
    sqlx::query(&format!("CREATE SCHEMA {stale}"))
        .execute(&pool)
        .await
        .unwrap();

    let Some(_fresh) = common::test_pool().await else {
        return;
    };

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM pg_namespace WHERE nspname = $1")
            .bind(&stale)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}
