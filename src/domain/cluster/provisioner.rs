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

//! The fleet bring-up pipeline.
//!
//! Creation runs in two strictly ordered batches: every cluster is created
//! before any cluster is finalized. Within a batch the per-cluster work is
//! fanned out concurrently, each task owning its own config copy.

use crate::domain::cluster::config::{cluster_name, populate_config};
use crate::domain::cluster::{cni, ClusterConfig};
use crate::domain::config::FleetOptions;
use crate::infrastructure::constants;
use crate::infrastructure::kubernetes::wait::WaitConfig;
use crate::infrastructure::kubernetes::new_cluster_client;
use crate::infrastructure::provider::{generate_config_file, ClusterProvider, KindProvider};
use crate::shared::error::Result;
use crate::shared::tasks::{run_tasks_with_timeout, Task};
use futures::FutureExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

pub struct FleetProvisioner {
    provider: Arc<dyn ClusterProvider>,
}

impl FleetProvisioner {
    pub fn new(provider: Arc<dyn ClusterProvider>) -> Self {
        Self { provider }
    }

    pub fn with_kind() -> Self {
        Self::new(Arc::new(KindProvider::new()))
    }

    /// Configs for the ordinals whose cluster does not already exist.
    pub async fn target_configs(&self, opts: &FleetOptions) -> Result<Vec<ClusterConfig>> {
        let known = self.provider.list_clusters().await?;

        let mut targets = Vec::new();
        for ordinal in 1..=opts.num_clusters {
            let name = cluster_name(ordinal);
            if known.contains(&name) {
                info!("✔ Cluster with the name {:?} already exists.", name);
            } else {
                targets.push(populate_config(ordinal, opts)?);
            }
        }
        Ok(targets)
    }

    /// Brings up the whole fleet: configure, create all clusters, then
    /// finalize all clusters. Returns the configs of the clusters created.
    pub async fn create_fleet(&self, opts: &FleetOptions) -> Result<Vec<ClusterConfig>> {
        let targets = self.target_configs(opts).await?;
        if targets.is_empty() {
            info!("No new clusters to create.");
            return Ok(targets);
        }

        let config_dir = PathBuf::from(constants::KIND_CONFIG_DIR);
        self.create_stage(&targets, &config_dir).await?;

        info!("Finalizing the clusters setup ...");
        self.finalize_stage(&targets).await?;

        Ok(targets)
    }

    async fn create_stage(&self, targets: &[ClusterConfig], config_dir: &Path) -> Result<()> {
        let mut tasks: Vec<Task> = Vec::with_capacity(targets.len());
        for config in targets {
            let config_file = generate_config_file(config, config_dir)?;
            let provider = self.provider.clone();
            let config = config.clone();
            tasks.push(async move { provider.create(&config, &config_file).await }.boxed());
        }

        run_tasks_with_timeout(constants::CREATE_BATCH_TIMEOUT, tasks).await
    }

    async fn finalize_stage(&self, targets: &[ClusterConfig]) -> Result<()> {
        let tasks: Vec<Task> = targets
            .iter()
            .map(|config| {
                let config = config.clone();
                async move { finalize_cluster(config).await }.boxed()
            })
            .collect();

        run_tasks_with_timeout(constants::FINALIZE_BATCH_TIMEOUT, tasks).await
    }
}

async fn finalize_cluster(config: ClusterConfig) -> Result<()> {
    let client = new_cluster_client(&config.name, &config.kubeconfig_path).await?;
    cni::deploy_cni(&config, &client, &WaitConfig::default()).await?;
    info!("✔ Cluster {:?} is ready 🔥🔥🔥", config.name);
    Ok(())
}
