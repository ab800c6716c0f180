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

//! CNI installation. Each CNI pairs an embedded manifest with the
//! resources whose roll out marks the cluster's network as ready.
//! Manifests carrying CRDs get those applied and established first.

use crate::domain::cluster::ClusterConfig;
use crate::infrastructure::constants::KUBE_SYSTEM_NAMESPACE;
use crate::infrastructure::kubernetes::wait::WaitConfig;
use crate::infrastructure::kubernetes::{deploy, wait};
use crate::shared::error::Result;
use kube::Client;
use serde::{Deserialize, Serialize};
use std::fmt;

const CALICO_MANIFEST: &str = include_str!("../../../manifests/calico.yaml");
const CALICO_CRD_MANIFEST: &str = include_str!("../../../manifests/calico-crds.yaml");
const FLANNEL_MANIFEST: &str = include_str!("../../../manifests/flannel.yaml");
const WEAVE_MANIFEST: &str = include_str!("../../../manifests/weave.yaml");

const CALICO_DAEMON_SET: &str = "calico-node";
const FLANNEL_DAEMON_SET: &str = "kube-flannel-ds-amd64";
const WEAVE_DAEMON_SET: &str = "weave-net";
const DNS_DEPLOYMENT: &str = "coredns";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Cni {
    Calico,
    Flannel,
    Weave,
    Kindnet,
}

impl Cni {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cni::Calico => "calico",
            Cni::Flannel => "flannel",
            Cni::Weave => "weave",
            Cni::Kindnet => "kindnet",
        }
    }
}

impl fmt::Display for Cni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Installs the cluster's CNI and waits for its roll out, then for DNS to
/// come up on top of it.
pub async fn deploy_cni(config: &ClusterConfig, client: &Client, cfg: &WaitConfig) -> Result<()> {
    let name = &config.name;
    match config.cni {
        // The provider installs its default CNI itself.
        Cni::Kindnet => Ok(()),
        Cni::Calico => {
            deploy::crd_resources(name, client, CALICO_CRD_MANIFEST).await?;
            deploy::resources(name, client, &render(CALICO_MANIFEST, config), "Calico").await?;
            wait::for_daemon_set_ready(name, client, KUBE_SYSTEM_NAMESPACE, CALICO_DAEMON_SET, cfg)
                .await?;
            wait::for_deployment_ready(name, client, KUBE_SYSTEM_NAMESPACE, DNS_DEPLOYMENT, cfg)
                .await
        }
        Cni::Flannel => {
            deploy::resources(name, client, &render(FLANNEL_MANIFEST, config), "Flannel").await?;
            wait::for_daemon_set_ready(name, client, KUBE_SYSTEM_NAMESPACE, FLANNEL_DAEMON_SET, cfg)
                .await?;
            wait::for_deployment_ready(name, client, KUBE_SYSTEM_NAMESPACE, DNS_DEPLOYMENT, cfg)
                .await
        }
        Cni::Weave => {
            deploy::resources(name, client, &render(WEAVE_MANIFEST, config), "Weave").await?;
            wait::for_daemon_set_ready(name, client, KUBE_SYSTEM_NAMESPACE, WEAVE_DAEMON_SET, cfg)
                .await?;
            wait::for_deployment_ready(name, client, KUBE_SYSTEM_NAMESPACE, DNS_DEPLOYMENT, cfg)
                .await
        }
    }
}

/// Fills a manifest template with the cluster's network ranges.
fn render(template: &str, config: &ClusterConfig) -> String {
    template
        .replace("{{pod_subnet}}", &config.pod_subnet)
        .replace("{{service_subnet}}", &config.service_subnet)
        .replace("{{cluster_name}}", &config.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster::config::populate_config;
    use crate::domain::config::FleetOptions;
    use crate::infrastructure::kubernetes::deploy::{document_kind, split_documents};

    fn config() -> ClusterConfig {
        populate_config(1, &FleetOptions::default()).unwrap()
    }

    #[test]
    fn test_render_substitutes_network_ranges() {
        let rendered = render(CALICO_MANIFEST, &config());
        assert!(rendered.contains("value: \"10.4.0.0/14\""));
        assert!(!rendered.contains("{{pod_subnet}}"));

        let rendered = render(WEAVE_MANIFEST, &config());
        assert!(rendered.contains("value: \"10.4.0.0/14\""));
    }

    #[test]
    fn test_cni_manifests_only_carry_deployable_kinds() {
        let deployable = [
            "ServiceAccount",
            "Role",
            "RoleBinding",
            "ClusterRole",
            "ClusterRoleBinding",
            "ConfigMap",
            "Service",
            "Pod",
            "DaemonSet",
            "Deployment",
        ];

        for manifest in [CALICO_MANIFEST, FLANNEL_MANIFEST, WEAVE_MANIFEST] {
            for doc in split_documents(manifest).unwrap() {
                let kind = document_kind(&doc).unwrap();
                assert!(deployable.contains(&kind.as_str()), "unexpected kind {}", kind);
            }
        }
    }

    #[test]
    fn test_crd_manifest_only_carries_crds() {
        let docs = split_documents(CALICO_CRD_MANIFEST).unwrap();
        assert!(!docs.is_empty());
        for doc in docs {
            assert_eq!(document_kind(&doc).unwrap(), "CustomResourceDefinition");
        }
    }

    #[test]
    fn test_cni_names_round_trip() {
        for cni in [Cni::Calico, Cni::Flannel, Cni::Weave, Cni::Kindnet] {
            let serialized = serde_yaml::to_string(&cni).unwrap();
            let parsed: Cni = serde_yaml::from_str(&serialized).unwrap();
            assert_eq!(parsed, cni);
            assert_eq!(serialized.trim(), cni.as_str());
        }
    }
}
