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

use crate::shared::error::{FleetError, Result};
use backon::{ExponentialBuilder, Retryable};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Builds an API client for one cluster from its kubeconfig file.
///
/// The first request against a freshly created cluster can race the API
/// server still coming up, so the initial version probe is retried with
/// backoff before the client is handed out.
pub async fn new_cluster_client(cluster_name: &str, kubeconfig_path: &Path) -> Result<Client> {
    let kubeconfig = Kubeconfig::read_from(kubeconfig_path).map_err(|e| {
        FleetError::Config(format!(
            "failed to load kubeconfig for cluster {:?} from {:?}: {}",
            cluster_name, kubeconfig_path, e
        ))
    })?;

    let config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| {
            FleetError::Config(format!(
                "failed to build Kubernetes config for cluster {:?}: {}",
                cluster_name, e
            ))
        })?;

    let client = Client::try_from(config).map_err(|e| {
        FleetError::KubeApi(format!(
            "failed to create Kubernetes client for cluster {:?}: {}",
            cluster_name, e
        ))
    })?;

    let version = (|| async { client.apiserver_version().await })
        .retry(
            &ExponentialBuilder::default()
                .with_min_delay(Duration::from_secs(1))
                .with_max_times(8),
        )
        .await
        .map_err(|e| {
            FleetError::KubeApi(format!(
                "API server of cluster {:?} is not reachable: {}",
                cluster_name, e
            ))
        })?;

    debug!(
        "Connected to cluster {:?}, API server {}",
        cluster_name, version.git_version
    );
    Ok(client)
}
