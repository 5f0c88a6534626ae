//! Pool configuration options

use std::time::Duration;

/// Configuration for fleet pool behavior
///
/// # Examples
///
/// ```
/// use fleet_pool::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::new()
///     .with_name("showroom")
///     .with_acquire_timeout(Duration::from_secs(2));
///
/// assert_eq!(config.name, "showroom");
/// assert_eq!(config.acquire_timeout, Some(Duration::from_secs(2)));
/// ```
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Name used to label log events and metric exports
    pub name: String,

    /// How long an acquire may wait for admission before failing with a
    /// timeout error. `None` waits indefinitely.
    pub acquire_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            name: "fleet".to_string(),
            acquire_timeout: None,
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pool name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the admission timeout
    ///
    /// # Examples
    ///
    /// ```
    /// use fleet_pool::PoolConfig;
    /// use std::time::Duration;
    ///
    /// let config = PoolConfig::new()
    ///     .with_acquire_timeout(Duration::from_millis(500));
    ///
    /// assert_eq!(config.acquire_timeout, Some(Duration::from_millis(500)));
    /// ```
    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = Some(timeout);
        self
    }
}
