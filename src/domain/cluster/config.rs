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

//! Per-cluster configuration, derived once from the fleet options and the
//! cluster's ordinal and immutable afterwards.

use crate::domain::cluster::Cni;
use crate::domain::config::FleetOptions;
use crate::infrastructure::constants;
use crate::shared::error::{FleetError, Result};
use regex::Regex;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ClusterConfig {
    /// 1-based index of the cluster within the fleet
    pub ordinal: u32,

    /// The cluster name, derived from the ordinal
    pub name: String,

    /// The pod subnet cidr and mask
    pub pod_subnet: String,

    /// The service subnet cidr and mask
    pub service_subnet: String,

    /// The cni that will be installed for the cluster
    pub cni: Cni,

    /// The node image used for booting the cluster, if pinned
    pub node_image: Option<String>,

    /// The number of worker nodes
    pub num_workers: u32,

    /// The cluster dns domain name
    pub dns_domain: String,

    /// The kubeadm config schema version for the cluster
    pub kubeadm_api_version: String,

    /// Where the provider writes the cluster's kubeconfig
    pub kubeconfig_path: PathBuf,

    /// Whether to keep nodes running even if creation fails
    pub retain: bool,

    /// How long the provider waits for the control plane to be ready
    pub wait_for_ready: Duration,
}

/// The canonical cluster name for an ordinal.
pub fn cluster_name(ordinal: u32) -> String {
    format!("{}{}", constants::CLUSTER_NAME_BASE, ordinal)
}

/// Carves disjoint pod and service subnets for a cluster out of the fixed
/// base ranges.
///
/// A /14 pod range spans four second-octet values, so ordinals step the pod
/// octet by 4 and the service octet by 1. The octet arithmetic wraps: past
/// ordinal 63 the pod ranges fold back onto the base. With `overlap` set,
/// every cluster receives the unmodified bases, used deliberately for
/// cross-cluster conflict scenarios.
pub fn allocate_subnets(ordinal: u32, overlap: bool) -> (String, String) {
    let mut pod = constants::POD_CIDR_BASE.octets();
    let mut service = constants::SERVICE_CIDR_BASE.octets();

    if !overlap {
        pod[1] = pod[1].wrapping_add(4u32.wrapping_mul(ordinal) as u8);
        service[1] = service[1].wrapping_add(ordinal as u8);
    }

    (
        format!("{}{}", Ipv4Addr::from(pod), constants::POD_CIDR_MASK),
        format!("{}{}", Ipv4Addr::from(service), constants::SERVICE_CIDR_MASK),
    )
}

/// Builds the desired cluster config for an ordinal.
pub fn populate_config(ordinal: u32, opts: &FleetOptions) -> Result<ClusterConfig> {
    let name = cluster_name(ordinal);
    let (pod_subnet, service_subnet) = allocate_subnets(ordinal, opts.overlap);

    let kubeadm_api_version = match &opts.node_image {
        Some(image) => kubeadm_api_version_for(&name, image)?,
        None => constants::KUBEADM_API_VERSION.to_string(),
    };

    // Until a CNI is installed the nodes never report Ready, so waiting on
    // the provider side would always run out the clock.
    let wait_for_ready = if opts.cni == Cni::Kindnet {
        opts.wait_for_ready
    } else {
        Duration::ZERO
    };

    Ok(ClusterConfig {
        ordinal,
        dns_domain: format!("{}.local", name),
        kubeconfig_path: constants::kube_config_path(&name),
        name,
        pod_subnet,
        service_subnet,
        cni: opts.cni,
        node_image: opts.node_image.clone(),
        num_workers: opts.num_workers,
        kubeadm_api_version,
        retain: opts.retain,
        wait_for_ready,
    })
}

/// Node images older than v1.15 only understand the v1beta1 kubeadm schema.
fn kubeadm_api_version_for(cluster_name: &str, image: &str) -> Result<String> {
    let version = Regex::new(r":v(\d+)\.(\d+)")
        .map_err(|e| FleetError::Config(format!("bad version pattern: {}", e)))?;

    let caps = version.captures(image).ok_or_else(|| {
        FleetError::Config(format!(
            "{:?}: could not extract version from {:?}; example of a correct image name: kindest/node:v1.15.3",
            cluster_name, image
        ))
    })?;

    let major: u64 = caps[1].parse().unwrap_or(0);
    let minor: u64 = caps[2].parse().unwrap_or(0);

    if major == 1 && minor < 15 {
        Ok(constants::KUBEADM_API_VERSION_LEGACY.to_string())
    } else {
        Ok(constants::KUBEADM_API_VERSION.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_subnets() {
        assert_eq!(
            allocate_subnets(1, false),
            ("10.4.0.0/14".to_string(), "100.1.0.0/16".to_string())
        );
        assert_eq!(
            allocate_subnets(2, false),
            ("10.8.0.0/14".to_string(), "100.2.0.0/16".to_string())
        );
    }

    #[test]
    fn test_subnets_are_pairwise_disjoint() {
        // A /14 starting on a multiple of 4 in the second octet is disjoint
        // from any other such /14; distinct second octets suffice for /16.
        let second_octet = |cidr: &str| -> u8 {
            cidr.split('.').nth(1).unwrap().parse().unwrap()
        };

        for i in 1..=16u32 {
            for j in 1..=16u32 {
                if i == j {
                    continue;
                }
                let (pod_i, service_i) = allocate_subnets(i, false);
                let (pod_j, service_j) = allocate_subnets(j, false);
                assert_ne!(second_octet(&pod_i), second_octet(&pod_j));
                assert_ne!(second_octet(&service_i), second_octet(&service_j));
            }
        }
    }

    #[test]
    fn test_overlap_mode_reuses_the_bases() {
        let (pod, service) = allocate_subnets(1, true);
        assert_eq!(pod, "10.0.0.0/14");
        assert_eq!(service, "100.0.0.0/16");

        for i in 2..=8 {
            assert_eq!(allocate_subnets(i, true), (pod.clone(), service.clone()));
        }
    }

    #[test]
    fn test_pod_octet_wraps_at_ordinal_64() {
        let (pod, _) = allocate_subnets(64, false);
        assert_eq!(pod, "10.0.0.0/14");
    }

    #[test]
    fn test_populate_config_derives_cluster_identity() {
        let config = populate_config(3, &FleetOptions::default()).unwrap();

        assert_eq!(config.name, "cluster3");
        assert_eq!(config.dns_domain, "cluster3.local");
        assert_eq!(config.num_workers, constants::NUM_WORKERS);
        assert_eq!(config.pod_subnet, "10.12.0.0/14");
        assert!(config
            .kubeconfig_path
            .ends_with(".kube/kind-config-cluster3"));
    }

    #[test]
    fn test_old_node_image_selects_legacy_kubeadm_schema() {
        let opts = FleetOptions {
            node_image: Some("kindest/node:v1.14.6".to_string()),
            ..Default::default()
        };
        let config = populate_config(1, &opts).unwrap();
        assert_eq!(config.kubeadm_api_version, constants::KUBEADM_API_VERSION_LEGACY);
    }

    #[test]
    fn test_recent_node_image_keeps_current_kubeadm_schema() {
        let opts = FleetOptions {
            node_image: Some("kindest/node:v1.30.0".to_string()),
            ..Default::default()
        };
        let config = populate_config(1, &opts).unwrap();
        assert_eq!(config.kubeadm_api_version, constants::KUBEADM_API_VERSION);
    }

    #[test]
    fn test_unversioned_node_image_is_rejected() {
        let opts = FleetOptions {
            node_image: Some("kindest/node:latest".to_string()),
            ..Default::default()
        };
        assert!(populate_config(1, &opts).is_err());
    }

    #[test]
    fn test_non_kindnet_cni_skips_provider_wait() {
        let opts = FleetOptions {
            cni: Cni::Weave,
            wait_for_ready: Duration::from_secs(300),
            ..Default::default()
        };
        let config = populate_config(1, &opts).unwrap();
        assert_eq!(config.wait_for_ready, Duration::ZERO);

        let opts = FleetOptions {
            cni: Cni::Kindnet,
            wait_for_ready: Duration::from_secs(300),
            ..Default::default()
        };
        let config = populate_config(1, &opts).unwrap();
        assert_eq!(config.wait_for_ready, Duration::from_secs(300));
    }
}
