// fleet_pool showroom simulation
// A fixed fleet of vehicles shared by more clients than vehicles.

// This is just a driver binary - the actual library is in lib.rs
// Run demos with: cargo run --example basic

use fleet_pool::{Client, FleetPool, PoolConfig};
use std::sync::Arc;
use std::time::Duration;

const FLEET_SIZE: usize = 4;
const CLIENT_COUNT: usize = 9;
const TEST_DRIVE: Duration = Duration::from_secs(1);

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let config = PoolConfig::new().with_name("showroom");
    let pool = Arc::new(FleetPool::new(FLEET_SIZE, config).expect("fleet size is non-zero"));

    let handles: Vec<_> = (1..=CLIENT_COUNT)
        .map(|n| Client::new(format!("Client {n}"), Arc::clone(&pool), TEST_DRIVE).spawn())
        .collect();

    for handle in handles {
        if let Err(err) = handle.await.expect("client task panicked") {
            tracing::error!(%err, "client aborted");
        }
    }

    tracing::info!("all clients have finished their test drives");
    tracing::info!(
        high_water = pool.metrics().high_water_mark,
        available = pool.available_vehicles(),
        "final fleet state"
    );
}
