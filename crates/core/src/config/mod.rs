use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::component::Placement;
use crate::system::DEFAULT_FRAME_RATE;
use crate::Result;

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub machine: MachineConfig,
    pub resources: ResourcesConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections and fields take
    /// their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let config = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Which machine to show and how to drive it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    pub number: u32,
    pub frame_rate: f64,
    pub location: Placement,
    pub muted: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            number: 1,
            frame_rate: DEFAULT_FRAME_RATE,
            location: Placement::ORIGIN,
            muted: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourcesConfig {
    pub root: PathBuf,
}

impl Default for ResourcesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("resources"),
        }
    }
}
