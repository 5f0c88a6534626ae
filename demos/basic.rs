//! Basic usage examples for FleetPool

use fleet_pool::{FleetPool, PoolConfig};
use std::time::Duration;

#[tokio::main]
async fn main() {
    println!("=== fleet_pool - Basic Examples ===\n");

    // Example 1: Simple checkout and return
    simple_checkout().await;

    // Example 2: Pool with configuration
    configured_pool().await;

    // Example 3: RAII lease
    lease().await;

    // Example 4: Metrics and health
    metrics_and_health().await;
}

async fn simple_checkout() {
    println!("1. Simple Checkout:");
    let pool = FleetPool::new(3, PoolConfig::default()).unwrap();

    let vehicle = pool.acquire().await.unwrap();
    println!("   Checked out vehicle: {}", vehicle.id());
    pool.release(vehicle).unwrap();

    println!("   Available after return: {}\n", pool.available_vehicles());
}

async fn configured_pool() {
    println!("2. Configured Pool:");

    let config = PoolConfig::new()
        .with_name("showroom")
        .with_acquire_timeout(Duration::from_millis(100));

    let pool = FleetPool::new(1, config).unwrap();

    // Hold the only vehicle so the next acquire has to wait.
    let held = pool.acquire().await.unwrap();
    println!("   Vehicle {} is out", held.id());

    match pool.acquire().await {
        Ok(_) => println!("   Got a vehicle"),
        Err(e) => println!("   Error: {e}"),
    }

    pool.release(held).unwrap();
    println!();
}

async fn lease() {
    println!("3. RAII Lease:");
    let pool = FleetPool::new(2, PoolConfig::default()).unwrap();

    {
        let lease = pool.acquire_lease().await.unwrap();
        println!("   Leased vehicle: {}", lease.id());
        println!("   Checked out during lease: {}", pool.checked_out());
        // Vehicle returned automatically when the lease drops
    }

    println!("   Available after lease drop: {}\n", pool.available_vehicles());
}

async fn metrics_and_health() {
    println!("4. Metrics and Health:");
    let pool = FleetPool::new(5, PoolConfig::new().with_name("demo")).unwrap();

    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();

    let health = pool.health_status();
    println!("   Health: {}", if health.is_healthy() { "Healthy" } else { "Unhealthy" });
    println!("   Utilization: {:.1}%", health.utilization * 100.0);
    println!(
        "   Checked out: {}, Available: {}",
        health.checked_out, health.available_vehicles
    );

    pool.release(a).unwrap();
    pool.release(b).unwrap();

    println!("\n   Metrics:");
    for (key, value) in pool.export_metrics() {
        println!("     {}: {}", key, value);
    }
}
