//! Error types for the fleet pool

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("fleet size must be at least 1")]
    InvalidFleetSize,

    #[error("wait for a vehicle was interrupted - pool is closed")]
    Interrupted,

    #[error("timed out after {0:?} waiting for a vehicle")]
    Timeout(std::time::Duration),

    #[error("vehicle {0} does not belong to this fleet")]
    ForeignVehicle(u32),

    #[error("vehicle {0} is not checked out")]
    NotCheckedOut(u32),
}

pub type PoolResult<T> = Result<T, PoolError>;
