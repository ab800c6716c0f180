// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fleet-wide options and their optional TOML defaults file.

use crate::domain::cluster::Cni;
use crate::infrastructure::constants;
use crate::shared::error::Result;
use serde::Deserialize;
use std::time::Duration;

/// Resolved options for one fleet bring-up.
///
/// Resolution order: command line over config file over defaults.
#[derive(Debug, Clone)]
pub struct FleetOptions {
    pub num_clusters: u32,
    pub cni: Cni,
    pub node_image: Option<String>,
    pub num_workers: u32,
    pub retain: bool,
    pub overlap: bool,
    pub wait_for_ready: Duration,
}

impl Default for FleetOptions {
    fn default() -> Self {
        Self {
            num_clusters: 2,
            cni: Cni::Kindnet,
            node_image: None,
            num_workers: constants::NUM_WORKERS,
            retain: true,
            overlap: false,
            wait_for_ready: Duration::from_secs(300),
        }
    }
}

/// The optional fleet defaults file (fleet.toml).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FleetConf {
    #[serde(default)]
    pub fleet: FleetSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FleetSection {
    pub num_clusters: Option<u32>,
    pub cni: Option<Cni>,
    pub image: Option<String>,
    pub workers: Option<u32>,
    pub retain: Option<bool>,
    pub overlap: Option<bool>,
    pub wait_secs: Option<u64>,
}

impl FleetConf {
    pub fn from(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }
}

impl FleetSection {
    /// Layers the file's values over `base`.
    pub fn apply_to(&self, mut base: FleetOptions) -> FleetOptions {
        if let Some(num_clusters) = self.num_clusters {
            base.num_clusters = num_clusters;
        }
        if let Some(cni) = self.cni {
            base.cni = cni;
        }
        if self.image.is_some() {
            base.node_image = self.image.clone();
        }
        if let Some(workers) = self.workers {
            base.num_workers = workers;
        }
        if let Some(retain) = self.retain {
            base.retain = retain;
        }
        if let Some(overlap) = self.overlap {
            base.overlap = overlap;
        }
        if let Some(wait_secs) = self.wait_secs {
            base.wait_for_ready = Duration::from_secs(wait_secs);
        }
        base
    }
}
