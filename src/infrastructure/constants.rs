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

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

/// Cluster naming
pub const CLUSTER_NAME_BASE: &str = "cluster";

/// Network defaults. Each cluster is carved out of these bases by its
/// ordinal; see `domain::cluster::config::allocate_subnets`.
pub const POD_CIDR_BASE: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 0);
pub const POD_CIDR_MASK: &str = "/14";
pub const SERVICE_CIDR_BASE: Ipv4Addr = Ipv4Addr::new(100, 0, 0, 0);
pub const SERVICE_CIDR_MASK: &str = "/16";

/// The number of worker nodes per cluster
pub const NUM_WORKERS: u32 = 2;

/// Generated artifact directories
pub const KIND_CONFIG_DIR: &str = "output/kind-clusters";
pub const KIND_LOGS_DIR: &str = "output/logs";
pub const IMAGE_EXPORT_DIR: &str = "output/images";

/// kubeadm config schema versions
pub const KUBEADM_API_VERSION: &str = "kubeadm.k8s.io/v1beta2";
pub const KUBEADM_API_VERSION_LEGACY: &str = "kubeadm.k8s.io/v1beta1";

/// Namespaces
pub const KUBE_SYSTEM_NAMESPACE: &str = "kube-system";
pub const DEFAULT_NAMESPACE: &str = "default";

/// Wall-clock ceilings for the per-stage task batches
pub const CREATE_BATCH_TIMEOUT: Duration = Duration::from_secs(20 * 60);
pub const FINALIZE_BATCH_TIMEOUT: Duration = Duration::from_secs(15 * 60);
pub const DEPLOY_BATCH_TIMEOUT: Duration = Duration::from_secs(10 * 60);
pub const LOAD_BATCH_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Default readiness polling window
pub const WAIT_DURATION_RESOURCES: Duration = Duration::from_secs(10 * 60);
pub const WAIT_RETRY_PERIOD: Duration = Duration::from_secs(2);

/// CRDs establish quickly; a short window is enough
pub const WAIT_DURATION_CRDS: Duration = Duration::from_secs(30);
pub const WAIT_RETRY_PERIOD_CRDS: Duration = Duration::from_secs(1);

/// The kubeconfig file kind writes for a cluster, under ~/.kube
pub fn kube_config_path(cluster_name: &str) -> PathBuf {
    let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
    home.join(".kube")
        .join(format!("kind-config-{}", cluster_name))
}

/// The generated kind config file for a cluster
pub fn kind_config_file(cluster_name: &str) -> PathBuf {
    PathBuf::from(KIND_CONFIG_DIR).join(format!("kind-config-{}.yaml", cluster_name))
}
