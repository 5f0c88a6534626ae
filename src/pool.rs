//! The fleet pool and its checkout lease

use crate::config::PoolConfig;
use crate::errors::{PoolError, PoolResult};
use crate::health::HealthStatus;
use crate::metrics::{MetricsExporter, MetricsTracker, PoolMetrics};
use crate::vehicle::Vehicle;

use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::Deref;
use std::sync::atomic::Ordering;
use tokio::sync::Semaphore;

/// A fixed fleet of vehicles shared by concurrent clients.
///
/// The pool owns `fleet_size` vehicles and lends out at most that many at a
/// time. Admission is a FIFO-fair semaphore created with one permit per
/// vehicle: when the whole fleet is checked out, further callers queue in
/// arrival order, and dropping a queued acquire gives the place up without
/// consuming capacity. The slot table mapping each vehicle to its in-use
/// flag is guarded by a single mutex; `acquire`'s scan-and-mark and
/// `release`'s unmark are the only critical sections that touch it.
#[derive(Debug)]
pub struct FleetPool {
    vehicles: Vec<Vehicle>,
    in_use: Mutex<Vec<bool>>,
    admission: Semaphore,
    config: PoolConfig,
    metrics: MetricsTracker,
}

impl FleetPool {
    /// Create a pool with vehicles numbered `1..=fleet_size`.
    ///
    /// Fails with `PoolError::InvalidFleetSize` when `fleet_size` is zero.
    pub fn new(fleet_size: usize, config: PoolConfig) -> PoolResult<Self> {
        if fleet_size == 0 {
            return Err(PoolError::InvalidFleetSize);
        }

        let vehicles = (1..=fleet_size).map(|id| Vehicle::new(id as u32)).collect();

        Ok(Self {
            vehicles,
            in_use: Mutex::new(vec![false; fleet_size]),
            admission: Semaphore::new(fleet_size),
            config,
            metrics: MetricsTracker::new(),
        })
    }

    /// Check out a vehicle, waiting until one is free.
    ///
    /// Callers beyond the fleet size queue in first-come-first-served
    /// order. With an `acquire_timeout` configured the wait fails with
    /// `PoolError::Timeout` once it elapses; a closed pool fails with
    /// `PoolError::Interrupted`. Either failure grants nothing and leaves
    /// the admission accounting untouched.
    pub async fn acquire(&self) -> PoolResult<Vehicle> {
        let permit = match self.config.acquire_timeout {
            Some(limit) => match tokio::time::timeout(limit, self.admission.acquire()).await {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) => {
                    self.metrics.interruptions.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(pool = %self.config.name, "wait interrupted - pool closed");
                    return Err(PoolError::Interrupted);
                }
                Err(_) => {
                    self.metrics.timeouts.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(pool = %self.config.name, ?limit, "timed out waiting for a vehicle");
                    return Err(PoolError::Timeout(limit));
                }
            },
            None => match self.admission.acquire().await {
                Ok(permit) => permit,
                Err(_) => {
                    self.metrics.interruptions.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(pool = %self.config.name, "wait interrupted - pool closed");
                    return Err(PoolError::Interrupted);
                }
            },
        };

        // The permit's capacity is owed back by `release`, not by the
        // permit itself.
        permit.forget();

        let vehicle = self.checkout_first_free();
        tracing::debug!(pool = %self.config.name, vehicle = vehicle.id(), "vehicle checked out");
        Ok(vehicle)
    }

    /// Check out a vehicle wrapped in a lease that returns it on drop.
    pub async fn acquire_lease(&self) -> PoolResult<Lease<'_>> {
        let vehicle = self.acquire().await?;
        Ok(Lease {
            vehicle,
            pool: self,
        })
    }

    /// Return a checked-out vehicle to the fleet.
    ///
    /// Release is strict: a vehicle from another fleet fails with
    /// `ForeignVehicle`, and a fleet vehicle that is not checked out fails
    /// with `NotCheckedOut`. Neither failure hands back admission capacity,
    /// so a misbehaving caller can never push the admission count above the
    /// number of free slots. Never suspends.
    pub fn release(&self, vehicle: Vehicle) -> PoolResult<()> {
        {
            let mut in_use = self.in_use.lock();
            let slot = self
                .vehicles
                .iter()
                .position(|v| v.id() == vehicle.id())
                .ok_or(PoolError::ForeignVehicle(vehicle.id()))?;

            if !in_use[slot] {
                return Err(PoolError::NotCheckedOut(vehicle.id()));
            }
            in_use[slot] = false;
        }

        self.metrics.total_returned.fetch_add(1, Ordering::Relaxed);
        self.admission.add_permits(1);
        tracing::debug!(pool = %self.config.name, vehicle = vehicle.id(), "vehicle returned");
        Ok(())
    }

    /// Close the pool.
    ///
    /// Every queued and future `acquire` fails with
    /// `PoolError::Interrupted`. Vehicles already out can still be
    /// returned.
    pub fn close(&self) {
        self.admission.close();
        tracing::debug!(pool = %self.config.name, "pool closed");
    }

    /// Scan the slot table for the first free vehicle and mark it in use.
    ///
    /// Admission guarantees a free slot exists; a full table here means the
    /// permit and slot bookkeeping have diverged.
    fn checkout_first_free(&self) -> Vehicle {
        let mut in_use = self.in_use.lock();
        let slot = in_use
            .iter()
            .position(|taken| !*taken)
            .unwrap_or_else(|| panic!("admission granted with no free slot - slot table corrupted"));
        in_use[slot] = true;

        let now_out = in_use.iter().filter(|taken| **taken).count();
        self.metrics.total_checked_out.fetch_add(1, Ordering::Relaxed);
        self.metrics.high_water_mark.fetch_max(now_out, Ordering::Relaxed);

        self.vehicles[slot]
    }

    /// The pool's name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Fleet size
    pub fn fleet_size(&self) -> usize {
        self.vehicles.len()
    }

    /// Vehicles currently free
    pub fn available_vehicles(&self) -> usize {
        self.in_use.lock().iter().filter(|taken| !**taken).count()
    }

    /// Vehicles currently checked out
    pub fn checked_out(&self) -> usize {
        self.in_use.lock().iter().filter(|taken| **taken).count()
    }

    /// Point-in-time metrics snapshot
    pub fn metrics(&self) -> PoolMetrics {
        let (checked_out, available) = self.counts();
        self.metrics.snapshot(checked_out, available, self.vehicles.len())
    }

    /// Export metrics as a HashMap
    pub fn export_metrics(&self) -> HashMap<String, String> {
        self.metrics().export()
    }

    /// Export metrics in Prometheus format, labeled with the pool's name
    pub fn export_metrics_prometheus(&self, tags: Option<&HashMap<String, String>>) -> String {
        MetricsExporter::export_prometheus(&self.metrics(), &self.config.name, tags)
    }

    /// Current health snapshot
    pub fn health_status(&self) -> HealthStatus {
        let (checked_out, available) = self.counts();
        HealthStatus::new(available, checked_out, self.vehicles.len())
    }

    fn counts(&self) -> (usize, usize) {
        let in_use = self.in_use.lock();
        let checked_out = in_use.iter().filter(|taken| **taken).count();
        (checked_out, in_use.len() - checked_out)
    }
}

/// A checked-out vehicle that returns itself to the pool when dropped.
///
/// Holding a lease is equivalent to having called `acquire`; dropping it is
/// equivalent to `release`. The explicit `acquire`/`release` pair remains
/// available for callers that hand a vehicle across task boundaries.
pub struct Lease<'a> {
    vehicle: Vehicle,
    pool: &'a FleetPool,
}

impl Lease<'_> {
    /// The leased vehicle
    pub fn vehicle(&self) -> Vehicle {
        self.vehicle
    }
}

impl Deref for Lease<'_> {
    type Target = Vehicle;

    fn deref(&self) -> &Self::Target {
        &self.vehicle
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        // The lease came from a successful acquire, so a strict-release
        // failure here means the caller already released by hand.
        if let Err(err) = self.pool.release(self.vehicle) {
            tracing::warn!(vehicle = self.vehicle.id(), %err, "lease drop could not return vehicle");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;
    use std::time::Duration;
    use tokio::time::Instant;

    fn pool(fleet_size: usize) -> FleetPool {
        FleetPool::new(fleet_size, PoolConfig::default()).unwrap()
    }

    #[test]
    fn rejects_empty_fleet() {
        let err = FleetPool::new(0, PoolConfig::default()).unwrap_err();
        assert_eq!(err, PoolError::InvalidFleetSize);
    }

    #[tokio::test]
    async fn acquire_and_release_round_trip() {
        let pool = pool(3);

        let vehicle = pool.acquire().await.unwrap();
        assert_eq!(pool.checked_out(), 1);
        assert_eq!(pool.available_vehicles(), 2);

        pool.release(vehicle).unwrap();
        assert_eq!(pool.checked_out(), 0);
        assert_eq!(pool.available_vehicles(), 3);
    }

    #[tokio::test]
    async fn hands_out_distinct_vehicles() {
        let pool = pool(3);

        let a = pool.acquire().await.unwrap();
        let b = pool.acquire().await.unwrap();
        let c = pool.acquire().await.unwrap();

        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
        assert_ne!(a.id(), c.id());
        assert_eq!(pool.available_vehicles(), 0);
    }

    #[tokio::test]
    async fn strict_release_rejects_foreign_vehicle() {
        let pool = pool(2);

        let err = pool.release(Vehicle::new(99)).unwrap_err();
        assert_eq!(err, PoolError::ForeignVehicle(99));

        // No capacity was invented: exactly two checkouts still fit.
        let _a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
        assert_eq!(pool.available_vehicles(), 0);
    }

    #[tokio::test]
    async fn strict_release_rejects_double_release() {
        let pool = pool(2);

        let vehicle = pool.acquire().await.unwrap();
        pool.release(vehicle).unwrap();

        let err = pool.release(vehicle).unwrap_err();
        assert_eq!(err, PoolError::NotCheckedOut(vehicle.id()));
        assert_eq!(pool.available_vehicles(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_release_returns_no_capacity() {
        let config = PoolConfig::new().with_acquire_timeout(Duration::from_millis(50));
        let pool = FleetPool::new(1, config).unwrap();

        let vehicle = pool.acquire().await.unwrap();
        pool.release(vehicle).unwrap();
        assert!(pool.release(vehicle).is_err());

        let again = pool.acquire().await.unwrap();
        // The rejected double release must not have minted a second permit.
        let err = pool.acquire().await.unwrap_err();
        assert_eq!(err, PoolError::Timeout(Duration::from_millis(50)));
        pool.release(again).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_times_out_when_fleet_is_exhausted() {
        let config = PoolConfig::new().with_acquire_timeout(Duration::from_millis(100));
        let pool = FleetPool::new(1, config).unwrap();

        let _held = pool.acquire().await.unwrap();
        let err = pool.acquire().await.unwrap_err();
        assert_eq!(err, PoolError::Timeout(Duration::from_millis(100)));
        assert_eq!(pool.metrics().timeouts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn waiters_are_admitted_in_arrival_order() {
        let pool = Arc::new(pool(1));
        let first = pool.acquire().await.unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();

        for tag in ["second", "third", "fourth"] {
            let pool = Arc::clone(&pool);
            let order = Arc::clone(&order);
            handles.push(tokio::spawn(async move {
                let vehicle = pool.acquire().await.unwrap();
                order.lock().push(tag);
                pool.release(vehicle).unwrap();
            }));
            // Let the task join the admission queue before the next one
            // starts, so arrival order is fixed.
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
        }

        pool.release(first).unwrap();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*order.lock(), vec!["second", "third", "fourth"]);
    }

    #[tokio::test(start_paused = true)]
    async fn single_vehicle_serializes_clients() {
        let pool = Arc::new(pool(1));
        let events = Arc::new(Mutex::new(Vec::new()));
        let mut handles = Vec::new();

        for name in ["first", "second"] {
            let pool = Arc::clone(&pool);
            let events = Arc::clone(&events);
            handles.push(tokio::spawn(async move {
                let vehicle = pool.acquire().await.unwrap();
                events.lock().push(format!("{name} out"));
                tokio::time::sleep(Duration::from_millis(10)).await;
                events.lock().push(format!("{name} back"));
                pool.release(vehicle).unwrap();
            }));
            tokio::task::yield_now().await;
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(
            *events.lock(),
            vec!["first out", "first back", "second out", "second back"]
        );
        assert_eq!(pool.metrics().high_water_mark, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn nine_clients_share_four_vehicles_in_waves() {
        let hold = Duration::from_millis(100);
        let pool = Arc::new(pool(4));
        let started = Instant::now();
        let mut handles = Vec::new();

        for _ in 0..9 {
            let pool = Arc::clone(&pool);
            handles.push(tokio::spawn(async move {
                let vehicle = pool.acquire().await.unwrap();
                tokio::time::sleep(hold).await;
                pool.release(vehicle).unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let metrics = pool.metrics();
        assert_eq!(metrics.total_checked_out, 9);
        assert_eq!(metrics.total_returned, 9);
        assert!(metrics.high_water_mark <= 4);
        assert_eq!(pool.available_vehicles(), 4);
        // Three waves of at most four concurrent test drives.
        assert!(started.elapsed() >= hold * 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn no_vehicle_is_double_lent() {
        let fleet_size = 3;
        let pool = Arc::new(pool(fleet_size));
        let held: Arc<Vec<AtomicBool>> =
            Arc::new((0..fleet_size).map(|_| AtomicBool::new(false)).collect());
        let mut handles = Vec::new();

        for _ in 0..30 {
            let pool = Arc::clone(&pool);
            let held = Arc::clone(&held);
            handles.push(tokio::spawn(async move {
                let vehicle = pool.acquire().await.unwrap();
                let slot = (vehicle.id() - 1) as usize;

                let was_held = held[slot].swap(true, Ordering::SeqCst);
                assert!(!was_held, "vehicle {} lent twice", vehicle.id());

                tokio::time::sleep(Duration::from_millis(1)).await;

                held[slot].store(false, Ordering::SeqCst);
                pool.release(vehicle).unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(pool.available_vehicles(), fleet_size);
        assert!(pool.metrics().high_water_mark <= fleet_size);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_waiter_leaks_no_capacity() {
        let pool = Arc::new(pool(1));
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.acquire().await })
        };
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        waiter.abort();
        assert!(waiter.await.unwrap_err().is_cancelled());

        // The aborted waiter consumed nothing; the held vehicle is still
        // the only admission outstanding.
        assert_eq!(pool.available_vehicles(), 0);
        pool.release(held).unwrap();

        let reacquired = pool.acquire().await.unwrap();
        assert_eq!(pool.available_vehicles(), 0);
        pool.release(reacquired).unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn close_interrupts_blocked_waiters() {
        let pool = Arc::new(pool(1));
        let held = pool.acquire().await.unwrap();

        let waiter = {
            let pool = Arc::clone(&pool);
            tokio::spawn(async move { pool.acquire().await })
        };
        tokio::task::yield_now().await;
        tokio::task::yield_now().await;

        pool.close();
        assert_eq!(waiter.await.unwrap().unwrap_err(), PoolError::Interrupted);

        // Vehicles already out can still come home.
        pool.release(held).unwrap();
        assert_eq!(pool.available_vehicles(), 1);

        // But nothing new goes out after close.
        assert_eq!(pool.acquire().await.unwrap_err(), PoolError::Interrupted);
        assert_eq!(pool.metrics().interruptions, 2);
    }

    #[tokio::test]
    async fn lease_returns_vehicle_on_drop() {
        let pool = pool(2);

        {
            let lease = pool.acquire_lease().await.unwrap();
            assert_eq!(pool.checked_out(), 1);
            assert_eq!(lease.vehicle().id(), lease.id());
        }

        assert_eq!(pool.checked_out(), 0);
        assert_eq!(pool.available_vehicles(), 2);
        assert_eq!(pool.metrics().total_returned, 1);
    }

    #[tokio::test]
    #[should_panic(expected = "slot table corrupted")]
    async fn checkout_without_admission_panics_when_full() {
        let pool = pool(1);
        let _held = pool.acquire().await.unwrap();

        // Bypassing admission with a full table must fail loudly, not hand
        // out a phantom vehicle.
        pool.checkout_first_free();
    }
}
