//! SoftCache configuration

use l2store::{Error, Result};
use serde::{Deserialize, Serialize};

/// Default number of strongly pinned values
pub const DEFAULT_PIN_CAPACITY: usize = 256;

/// Default number of softly retained values
pub const DEFAULT_SOFT_CAPACITY: usize = 4096;

/// Settings for a [`crate::SoftCache`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftCacheConfig {
    /// Bound of the recently-read pin queue (0 disables pinning)
    pub pin_capacity: usize,

    /// Values kept alive by soft retention before they become reclaimable
    pub soft_capacity: usize,
}

impl Default for SoftCacheConfig {
    fn default() -> Self {
        Self {
            pin_capacity: DEFAULT_PIN_CAPACITY,
            soft_capacity: DEFAULT_SOFT_CAPACITY,
        }
    }
}

impl SoftCacheConfig {
    /// Set the pin queue bound
    pub fn with_pin_capacity(mut self, pin_capacity: usize) -> Self {
        self.pin_capacity = pin_capacity;
        self
    }

    /// Set the soft retention bound
    pub fn with_soft_capacity(mut self, soft_capacity: usize) -> Self {
        self.soft_capacity = soft_capacity;
        self
    }

    /// Reject settings the cache cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.soft_capacity == 0 {
            return Err(Error::Config(
                "soft_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
