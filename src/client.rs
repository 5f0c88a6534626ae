//! Clients, the concurrent consumers that exercise the pool

use crate::errors::PoolResult;
use crate::pool::FleetPool;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// One concurrent consumer: checks out a vehicle, test drives it for a
/// fixed duration, and returns it.
///
/// A client is a unit of work, not a thread. The driver spawns each client
/// onto the runtime and joins the returned handle; the run's outcome
/// travels through the handle.
pub struct Client {
    name: String,
    pool: Arc<FleetPool>,
    test_drive: Duration,
}

impl Client {
    /// Create a client that will test drive one vehicle from `pool` for
    /// `test_drive`.
    pub fn new(name: impl Into<String>, pool: Arc<FleetPool>, test_drive: Duration) -> Self {
        Self {
            name: name.into(),
            pool,
            test_drive,
        }
    }

    /// Spawn the client onto the runtime.
    pub fn spawn(self) -> JoinHandle<PoolResult<()>> {
        tokio::spawn(self.run())
    }

    /// Acquire, hold, release.
    ///
    /// A failed acquire ends the run early; the client releases nothing it
    /// never received.
    pub async fn run(self) -> PoolResult<()> {
        let vehicle = self.pool.acquire().await?;
        tracing::info!(client = %self.name, vehicle = vehicle.id(), "test driving");

        tokio::time::sleep(self.test_drive).await;
        tracing::info!(client = %self.name, vehicle = vehicle.id(), "finished test drive");

        self.pool.release(vehicle)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PoolConfig;
    use crate::errors::PoolError;

    #[tokio::test(start_paused = true)]
    async fn client_runs_to_completion() {
        let pool = Arc::new(FleetPool::new(1, PoolConfig::default()).unwrap());

        let client = Client::new("Client 1", Arc::clone(&pool), Duration::from_millis(10));
        client.spawn().await.unwrap().unwrap();

        assert_eq!(pool.available_vehicles(), 1);
        assert_eq!(pool.metrics().total_returned, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interrupted_client_reports_failure() {
        let pool = Arc::new(FleetPool::new(1, PoolConfig::default()).unwrap());
        let held = pool.acquire().await.unwrap();

        let handle = Client::new("Client 2", Arc::clone(&pool), Duration::from_millis(10)).spawn();
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        pool.close();
        assert_eq!(handle.await.unwrap().unwrap_err(), PoolError::Interrupted);

        // The interrupted client held nothing, so the pool still tracks
        // exactly one vehicle out.
        assert_eq!(pool.checked_out(), 1);
        pool.release(held).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn showroom_run_completes_for_all_clients() {
        let pool = Arc::new(FleetPool::new(4, PoolConfig::default()).unwrap());

        let handles: Vec<_> = (1..=9)
            .map(|n| {
                Client::new(format!("Client {n}"), Arc::clone(&pool), Duration::from_millis(100))
                    .spawn()
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let metrics = pool.metrics();
        assert_eq!(metrics.total_checked_out, 9);
        assert_eq!(metrics.total_returned, 9);
        assert!(metrics.high_water_mark <= 4);
        assert_eq!(pool.available_vehicles(), 4);
    }
}
