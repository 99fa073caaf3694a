//! Device classification for prefetch decisions

use crate::utils::error::IptvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How aggressively neighbours may be prefetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Low memory, few cores, metered or save-data connection
    Constrained,
    Unconstrained,
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceClass::Constrained => f.write_str("constrained"),
            DeviceClass::Unconstrained => f.write_str("unconstrained"),
        }
    }
}

impl FromStr for DeviceClass {
    type Err = IptvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "constrained" | "low" => Ok(DeviceClass::Constrained),
            "unconstrained" | "high" => Ok(DeviceClass::Unconstrained),
            other => Err(IptvError::invalid_input(format!("unknown device class '{}'", other))),
        }
    }
}

/// Observed device capabilities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceProfile {
    /// Approximate device memory in GiB, if known
    pub memory_gb: Option<f32>,

    /// Logical CPU count, if known
    pub cpu_cores: Option<usize>,

    /// User asked for reduced data usage
    pub save_data: bool,

    pub mobile: bool,
}

impl DeviceProfile {
    const MIN_MEMORY_GB: f32 = 4.0;
    const MIN_CORES: usize = 4;

    /// Profile of the current host
    pub fn detect() -> Self {
        Self {
            memory_gb: None,
            cpu_cores: std::thread::available_parallelism().ok().map(|n| n.get()),
            save_data: false,
            mobile: false,
        }
    }

    /// Constrained when any known signal falls below the thresholds
    pub fn classify(&self) -> DeviceClass {
        let low_memory = self.memory_gb.is_some_and(|gb| gb < Self::MIN_MEMORY_GB);
        let few_cores = self.cpu_cores.is_some_and(|n| n < Self::MIN_CORES);
        if self.save_data || self.mobile || low_memory || few_cores {
            DeviceClass::Constrained
        } else {
            DeviceClass::Unconstrained
        }
    }
}
