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

//! Typed model of the kind cluster config document.

use crate::domain::cluster::{ClusterConfig, Cni};
use crate::shared::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_KIND: &str = "Cluster";
const CONFIG_API_VERSION: &str = "kind.x-k8s.io/v1alpha4";
const ROLE_CONTROL_PLANE: &str = "control-plane";
const ROLE_WORKER: &str = "worker";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KindClusterConfig {
    kind: String,
    api_version: String,
    networking: Networking,
    nodes: Vec<Node>,
    kubeadm_config_patches: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Networking {
    #[serde(rename = "disableDefaultCNI")]
    disable_default_cni: bool,
    pod_subnet: String,
    service_subnet: String,
}

#[derive(Debug, Clone, Serialize)]
struct Node {
    role: String,
}

impl KindClusterConfig {
    pub fn from_cluster(config: &ClusterConfig) -> Self {
        let mut nodes = vec![Node {
            role: ROLE_CONTROL_PLANE.to_string(),
        }];
        nodes.extend((0..config.num_workers).map(|_| Node {
            role: ROLE_WORKER.to_string(),
        }));

        // The DNS domain is only reachable through a kubeadm patch.
        let cluster_configuration_patch = format!(
            "apiVersion: {}\nkind: ClusterConfiguration\nnetworking:\n  dnsDomain: {}\n",
            config.kubeadm_api_version, config.dns_domain
        );

        Self {
            kind: CONFIG_KIND.to_string(),
            api_version: CONFIG_API_VERSION.to_string(),
            networking: Networking {
                disable_default_cni: config.cni != Cni::Kindnet,
                pod_subnet: config.pod_subnet.clone(),
                service_subnet: config.service_subnet.clone(),
            },
            nodes,
            kubeadm_config_patches: vec![cluster_configuration_patch],
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Renders the kind config for `config` and writes it under `config_dir`,
/// returning the file path.
pub fn generate_config_file(config: &ClusterConfig, config_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(config_dir)?;

    let path = config_dir.join(format!("kind-config-{}.yaml", config.name));
    let rendered = KindClusterConfig::from_cluster(config).to_yaml()?;
    std::fs::write(&path, rendered)?;

    debug!("Kind config file for {:?} generated.", config.name);
    Ok(path)
}
