//! # fleet_pool
//!
//! Bounded vehicle fleet pool with FIFO-fair blocking checkout, for
//! simulating a showroom where many concurrent clients share a fixed fleet
//! of test-drive vehicles.
//!
//! ## Features
//!
//! - Capacity-bounded admission: at most `fleet_size` vehicles out at once
//! - First-come-first-served fairness among blocked callers
//! - Cancellable waits: dropping a queued acquire leaks no capacity
//! - Explicit `acquire`/`release` plus an RAII [`Lease`]
//! - Strict release: returning an unknown vehicle is an error, never a
//!   silent permit leak
//! - Optional acquire timeout and pool shutdown via [`FleetPool::close`]
//! - Metrics and health snapshots, with Prometheus-format export
//!
//! ## Quick Start
//!
//! ```rust
//! use fleet_pool::{FleetPool, PoolConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let pool = FleetPool::new(4, PoolConfig::default()).unwrap();
//!
//! let vehicle = pool.acquire().await.unwrap();
//! println!("Checked out vehicle {}", vehicle.id());
//! pool.release(vehicle).unwrap();
//! # }
//! ```

mod client;
mod config;
mod errors;
mod health;
mod metrics;
mod pool;
mod vehicle;

pub use client::Client;
pub use config::PoolConfig;
pub use errors::{PoolError, PoolResult};
pub use health::HealthStatus;
pub use metrics::{MetricsExporter, PoolMetrics};
pub use pool::{FleetPool, Lease};
pub use vehicle::Vehicle;
