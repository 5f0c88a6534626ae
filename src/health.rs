//! Health monitoring for the fleet pool

/// Health status of a fleet pool
///
/// # Examples
///
/// ```
/// use fleet_pool::{FleetPool, PoolConfig};
///
/// let pool = FleetPool::new(3, PoolConfig::default()).unwrap();
///
/// let health = pool.health_status();
/// assert!(health.is_healthy());
/// assert_eq!(health.available_vehicles, 3);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HealthStatus {
    /// Whether the pool is healthy
    pub is_healthy: bool,

    /// Number of warnings detected
    pub warning_count: usize,

    /// Current fleet utilization (0.0 to 1.0)
    pub utilization: f64,

    /// Available vehicles count
    pub available_vehicles: usize,

    /// Checked-out vehicles count
    pub checked_out: usize,

    /// Fleet size
    pub fleet_size: usize,

    /// Warning messages
    pub warnings: Vec<String>,
}

impl HealthStatus {
    /// Create a new health status
    pub(crate) fn new(available: usize, checked_out: usize, fleet_size: usize) -> Self {
        let utilization = if fleet_size > 0 {
            checked_out as f64 / fleet_size as f64
        } else {
            0.0
        };

        let mut warnings = Vec::new();
        let mut is_healthy = true;

        // Check for high utilization
        if utilization > 0.9 {
            warnings.push(format!("High utilization: {:.1}%", utilization * 100.0));
            is_healthy = false;
        }

        // Check if the whole fleet is out
        if available == 0 && fleet_size > 0 {
            warnings.push("No vehicles available".to_string());
        }

        Self {
            is_healthy,
            warning_count: warnings.len(),
            utilization,
            available_vehicles: available,
            checked_out,
            fleet_size,
            warnings,
        }
    }

    /// Check if the pool is healthy
    pub fn is_healthy(&self) -> bool {
        self.is_healthy
    }
}
