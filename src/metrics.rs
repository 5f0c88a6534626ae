//! Metrics collection and export for the fleet pool

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Point-in-time metrics for a pool
///
/// # Examples
///
/// ```
/// use fleet_pool::{FleetPool, PoolConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let pool = FleetPool::new(3, PoolConfig::default()).unwrap();
///
/// let vehicle = pool.acquire().await.unwrap();
/// let metrics = pool.metrics();
/// assert_eq!(metrics.total_checked_out, 1);
/// assert_eq!(metrics.checked_out, 1);
/// pool.release(vehicle).unwrap();
/// # }
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PoolMetrics {
    /// Total vehicles checked out over the pool's lifetime
    pub total_checked_out: usize,

    /// Total vehicles returned over the pool's lifetime
    pub total_returned: usize,

    /// Vehicles currently checked out
    pub checked_out: usize,

    /// Vehicles currently available
    pub available: usize,

    /// Most vehicles ever checked out at the same time
    pub high_water_mark: usize,

    /// Acquires that gave up after the configured timeout
    pub timeouts: usize,

    /// Acquires interrupted by the pool closing
    pub interruptions: usize,

    /// Fleet utilization ratio (0.0 to 1.0)
    pub utilization: f64,

    /// Fleet size
    pub fleet_size: usize,
}

impl PoolMetrics {
    /// Export metrics as a HashMap
    pub fn export(&self) -> HashMap<String, String> {
        let mut metrics = HashMap::new();
        metrics.insert("total_checked_out".to_string(), self.total_checked_out.to_string());
        metrics.insert("total_returned".to_string(), self.total_returned.to_string());
        metrics.insert("checked_out".to_string(), self.checked_out.to_string());
        metrics.insert("available".to_string(), self.available.to_string());
        metrics.insert("high_water_mark".to_string(), self.high_water_mark.to_string());
        metrics.insert("timeouts".to_string(), self.timeouts.to_string());
        metrics.insert("interruptions".to_string(), self.interruptions.to_string());
        metrics.insert("utilization".to_string(), format!("{:.2}", self.utilization));
        metrics.insert("fleet_size".to_string(), self.fleet_size.to_string());
        metrics
    }
}

/// Metrics exporter for Prometheus format
pub struct MetricsExporter;

impl MetricsExporter {
    /// Export metrics in Prometheus exposition format
    ///
    /// # Examples
    ///
    /// ```
    /// use fleet_pool::{FleetPool, PoolConfig};
    /// use std::collections::HashMap;
    ///
    /// let pool = FleetPool::new(3, PoolConfig::new().with_name("showroom")).unwrap();
    ///
    /// let mut tags = HashMap::new();
    /// tags.insert("site".to_string(), "north".to_string());
    ///
    /// let output = pool.export_metrics_prometheus(Some(&tags));
    /// assert!(output.contains("fleetpool_vehicles_checked_out"));
    /// assert!(output.contains("site=\"north\""));
    /// ```
    pub fn export_prometheus(
        metrics: &PoolMetrics,
        pool_name: &str,
        tags: Option<&HashMap<String, String>>,
    ) -> String {
        let mut output = String::new();
        let labels = Self::format_labels(pool_name, tags);

        // Gauge metrics
        output.push_str("# HELP fleetpool_vehicles_checked_out Vehicles currently checked out\n");
        output.push_str("# TYPE fleetpool_vehicles_checked_out gauge\n");
        output.push_str(&format!("fleetpool_vehicles_checked_out{{{}}} {}\n", labels, metrics.checked_out));

        output.push_str("# HELP fleetpool_vehicles_available Vehicles currently available\n");
        output.push_str("# TYPE fleetpool_vehicles_available gauge\n");
        output.push_str(&format!("fleetpool_vehicles_available{{{}}} {}\n", labels, metrics.available));

        output.push_str("# HELP fleetpool_utilization Fleet utilization ratio\n");
        output.push_str("# TYPE fleetpool_utilization gauge\n");
        output.push_str(&format!("fleetpool_utilization{{{}}} {:.2}\n", labels, metrics.utilization));

        output.push_str("# HELP fleetpool_checked_out_high_water Most vehicles checked out at once\n");
        output.push_str("# TYPE fleetpool_checked_out_high_water gauge\n");
        output.push_str(&format!("fleetpool_checked_out_high_water{{{}}} {}\n", labels, metrics.high_water_mark));

        // Counter metrics
        output.push_str("# HELP fleetpool_checkouts_total Total vehicles checked out\n");
        output.push_str("# TYPE fleetpool_checkouts_total counter\n");
        output.push_str(&format!("fleetpool_checkouts_total{{{}}} {}\n", labels, metrics.total_checked_out));

        output.push_str("# HELP fleetpool_returns_total Total vehicles returned\n");
        output.push_str("# TYPE fleetpool_returns_total counter\n");
        output.push_str(&format!("fleetpool_returns_total{{{}}} {}\n", labels, metrics.total_returned));

        output.push_str("# HELP fleetpool_wait_timeouts_total Acquires that timed out\n");
        output.push_str("# TYPE fleetpool_wait_timeouts_total counter\n");
        output.push_str(&format!("fleetpool_wait_timeouts_total{{{}}} {}\n", labels, metrics.timeouts));

        output.push_str("# HELP fleetpool_wait_interruptions_total Acquires interrupted by close\n");
        output.push_str("# TYPE fleetpool_wait_interruptions_total counter\n");
        output.push_str(&format!("fleetpool_wait_interruptions_total{{{}}} {}\n", labels, metrics.interruptions));

        output
    }

    fn format_labels(pool_name: &str, tags: Option<&HashMap<String, String>>) -> String {
        let mut labels = vec![format!("pool=\"{}\"", pool_name)];

        if let Some(tags) = tags {
            for (key, value) in tags {
                labels.push(format!("{}=\"{}\"", key, value));
            }
        }

        labels.join(",")
    }
}

/// Internal metrics tracker
#[derive(Debug)]
pub(crate) struct MetricsTracker {
    pub total_checked_out: AtomicUsize,
    pub total_returned: AtomicUsize,
    pub timeouts: AtomicUsize,
    pub interruptions: AtomicUsize,
    pub high_water_mark: AtomicUsize,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self {
            total_checked_out: AtomicUsize::new(0),
            total_returned: AtomicUsize::new(0),
            timeouts: AtomicUsize::new(0),
            interruptions: AtomicUsize::new(0),
            high_water_mark: AtomicUsize::new(0),
        }
    }

    pub fn snapshot(&self, checked_out: usize, available: usize, fleet_size: usize) -> PoolMetrics {
        let utilization = if fleet_size > 0 {
            checked_out as f64 / fleet_size as f64
        } else {
            0.0
        };

        PoolMetrics {
            total_checked_out: self.total_checked_out.load(Ordering::Relaxed),
            total_returned: self.total_returned.load(Ordering::Relaxed),
            checked_out,
            available,
            high_water_mark: self.high_water_mark.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            interruptions: self.interruptions.load(Ordering::Relaxed),
            utilization,
            fleet_size,
        }
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new()
    }
}
