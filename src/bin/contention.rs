//! Contention check
//!
//! Opens a store with a fixed budget and fires concurrent acquisitions at it,
//! then confirms the budget never went negative.
//!
//! Run with: cargo run --bin contention --release -- --budget 10000 --price 3000 --attempts 20

use std::time::Instant;

use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use dealership::domain::OperationContext;
use dealership::handlers::{
    AcquireCarCommand, AcquireCarHandler, CreateStoreCommand, CreateStoreHandler,
};
use dealership::{db, AppError, ErrorKind};

fn arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let budget = arg(&args, "--budget").unwrap_or_else(|| "10000".to_string());
    let price = arg(&args, "--price").unwrap_or_else(|| "3000".to_string());
    let attempts: usize = arg(&args, "--attempts")
        .and_then(|s| s.parse().ok())
        .unwrap_or(20);

    let database_url = std::env::var("DATABASE_URL")?;

    println!(
        "Contention check - {} concurrent acquisitions of {} against a budget of {}",
        attempts, price, budget
    );

    let pool = PgPoolOptions::new()
        .max_connections(attempts.clamp(2, 50) as u32)
        .connect(&database_url)
        .await?;
    db::run_migrations(&pool).await?;

    let context = OperationContext::new();
    let store = CreateStoreHandler::new(pool.clone())
        .execute(
            CreateStoreCommand::new("Contention Store".to_string()).with_budget(budget),
            &context,
        )
        .await?;

    let start = Instant::now();

    let tasks: Vec<_> = (0..attempts)
        .map(|i| {
            let handler = AcquireCarHandler::new(pool.clone());
            let command = AcquireCarCommand::new(
                store.id,
                "Load".to_string(),
                format!("Car {}", i),
                price.clone(),
            );
            tokio::spawn(async move { handler.execute(command, &OperationContext::new()).await })
        })
        .collect();

    let mut succeeded = 0usize;
    let mut rejected = 0usize;
    let mut failed = 0usize;

    for task in tasks {
        match task.await? {
            Ok(_) => succeeded += 1,
            Err(e) if e.kind() == ErrorKind::InsufficientBudget => rejected += 1,
            Err(AppError::Domain(_)) => rejected += 1,
            Err(e) => {
                eprintln!("Acquisition failed: {}", e);
                failed += 1;
            }
        }
    }

    let elapsed = start.elapsed();

    let final_budget: Decimal = sqlx::query_scalar("SELECT budget FROM stores WHERE id = $1")
        .bind(store.id)
        .fetch_one(&pool)
        .await?;

    println!("\n=== Contention Results ===");
    println!("Store: {}", store.id);
    println!("Succeeded: {}", succeeded);
    println!("Rejected: {}", rejected);
    println!("Failed: {}", failed);
    println!("Final budget: {:.2}", final_budget);
    println!("Time: {:.2}s", elapsed.as_secs_f64());

    if final_budget.is_sign_negative() {
        anyhow::bail!("Budget went negative: {}", final_budget);
    }
    println!("No overdraft");

    Ok(())
}
