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

// Core modules
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export commonly used types
pub use domain::cluster::{
    allocate_subnets, cluster_name, populate_config, ClusterConfig, Cni, FleetProvisioner,
};
pub use domain::config::{FleetConf, FleetOptions};
pub use infrastructure::engine::DockerEngine;
pub use infrastructure::kubernetes::{new_cluster_client, PollOutcome, WaitConfig};
pub use infrastructure::provider::{ClusterProvider, KindProvider};
pub use shared::{run_tasks_with_timeout, FleetError, Result, Task};
