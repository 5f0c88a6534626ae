//! Concurrent showroom simulation

use fleet_pool::{Client, FleetPool, PoolConfig};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    println!("=== fleet_pool - Concurrent Examples ===\n");

    // Example 1: More clients than vehicles
    showroom_rush().await;

    // Example 2: Closing the pool while clients wait
    closing_time().await;
}

async fn showroom_rush() {
    println!("1. Showroom Rush (9 clients, 4 vehicles):");

    let pool = Arc::new(
        FleetPool::new(4, PoolConfig::new().with_name("showroom")).unwrap(),
    );

    let handles: Vec<_> = (1..=9)
        .map(|n| {
            Client::new(
                format!("Client {n}"),
                Arc::clone(&pool),
                Duration::from_millis(200),
            )
            .spawn()
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let metrics = pool.metrics();
    println!("   All clients finished");
    println!("   Peak concurrent test drives: {}", metrics.high_water_mark);
    println!("   Total checkouts: {}\n", metrics.total_checked_out);
}

async fn closing_time() {
    println!("2. Closing Time:");

    let pool = Arc::new(FleetPool::new(1, PoolConfig::default()).unwrap());
    let held = pool.acquire().await.unwrap();

    let waiting = Client::new("Latecomer", Arc::clone(&pool), Duration::from_millis(50)).spawn();
    tokio::time::sleep(Duration::from_millis(10)).await;

    pool.close();
    match waiting.await.unwrap() {
        Ok(()) => println!("   Latecomer finished a test drive"),
        Err(e) => println!("   Latecomer turned away: {e}"),
    }

    pool.release(held).unwrap();
    println!("   Vehicles back on the lot: {}", pool.available_vehicles());
}
