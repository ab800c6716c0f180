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

//! The cluster lifecycle provider. Cluster bring-up itself is delegated to
//! the external `kind` binary, reached through the narrow
//! [`ClusterProvider`] interface.

pub mod config;
pub mod kind;

use crate::domain::cluster::ClusterConfig;
use crate::shared::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub use self::config::generate_config_file;
pub use self::kind::KindProvider;

#[async_trait]
pub trait ClusterProvider: Send + Sync {
    /// Creates the cluster described by `config` from the raw provider
    /// config file at `config_file`.
    async fn create(&self, config: &ClusterConfig, config_file: &Path) -> Result<()>;

    /// Deletes the named cluster and its kubeconfig entry.
    async fn delete(&self, cluster_name: &str, kubeconfig_path: &Path) -> Result<()>;

    /// Names of all clusters the provider currently knows about.
    async fn list_clusters(&self) -> Result<Vec<String>>;

    /// Node container names of the named cluster.
    async fn list_nodes(&self, cluster_name: &str) -> Result<Vec<String>>;

    /// Whether a cluster with this name already exists.
    async fn is_known(&self, cluster_name: &str) -> Result<bool>;

    /// Loads an image tar archive into every node of the named cluster.
    async fn load_image_archive(&self, cluster_name: &str, archive: &Path) -> Result<()>;

    /// Collects the cluster's logs into `dir`.
    async fn collect_logs(&self, cluster_name: &str, dir: &Path) -> Result<()>;
}
