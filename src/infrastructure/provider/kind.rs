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

use crate::domain::cluster::ClusterConfig;
use crate::infrastructure::provider::ClusterProvider;
use crate::shared::error::{FleetError, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::{debug, info};

/// Cluster provider backed by the `kind` binary.
pub struct KindProvider {
    binary: String,
}

impl Default for KindProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl KindProvider {
    pub fn new() -> Self {
        Self {
            binary: "kind".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[String]) -> Result<String> {
        debug!("Running: {} {}", self.binary, args.join(" "));
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| FleetError::Provider(format!("failed to run {:?}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FleetError::Provider(format!(
                "{} {} failed: {}",
                self.binary,
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn create_args(config: &ClusterConfig, config_file: &Path) -> Vec<String> {
    let mut args = vec![
        "create".to_string(),
        "cluster".to_string(),
        "--name".to_string(),
        config.name.clone(),
        "--config".to_string(),
        config_file.display().to_string(),
        "--kubeconfig".to_string(),
        config.kubeconfig_path.display().to_string(),
        "--wait".to_string(),
        format!("{}s", config.wait_for_ready.as_secs()),
    ];
    if let Some(image) = &config.node_image {
        args.push("--image".to_string());
        args.push(image.clone());
    }
    if config.retain {
        args.push("--retain".to_string());
    }
    args
}

fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect()
}

#[async_trait]
impl ClusterProvider for KindProvider {
    async fn create(&self, config: &ClusterConfig, config_file: &Path) -> Result<()> {
        info!(
            "Creating cluster {:?}, cni: {}, podcidr: {}, servicecidr: {}, workers: {}.",
            config.name, config.cni, config.pod_subnet, config.service_subnet, config.num_workers
        );
        self.run(&create_args(config, config_file)).await?;
        Ok(())
    }

    async fn delete(&self, cluster_name: &str, kubeconfig_path: &Path) -> Result<()> {
        info!("Deleting cluster {:?} ...", cluster_name);
        self.run(&[
            "delete".to_string(),
            "cluster".to_string(),
            "--name".to_string(),
            cluster_name.to_string(),
            "--kubeconfig".to_string(),
            kubeconfig_path.display().to_string(),
        ])
        .await?;
        Ok(())
    }

    async fn list_clusters(&self) -> Result<Vec<String>> {
        let output = self
            .run(&["get".to_string(), "clusters".to_string()])
            .await?;
        Ok(non_empty_lines(&output))
    }

    async fn list_nodes(&self, cluster_name: &str) -> Result<Vec<String>> {
        let output = self
            .run(&[
                "get".to_string(),
                "nodes".to_string(),
                "--name".to_string(),
                cluster_name.to_string(),
            ])
            .await?;
        Ok(non_empty_lines(&output))
    }

    async fn is_known(&self, cluster_name: &str) -> Result<bool> {
        Ok(self
            .list_clusters()
            .await?
            .iter()
            .any(|name| name == cluster_name))
    }

    async fn load_image_archive(&self, cluster_name: &str, archive: &Path) -> Result<()> {
        self.run(&[
            "load".to_string(),
            "image-archive".to_string(),
            archive.display().to_string(),
            "--name".to_string(),
            cluster_name.to_string(),
        ])
        .await?;
        info!(
            "✔ Image archive {:?} was loaded into cluster {:?}.",
            archive, cluster_name
        );
        Ok(())
    }

    async fn collect_logs(&self, cluster_name: &str, dir: &Path) -> Result<()> {
        self.run(&[
            "export".to_string(),
            "logs".to_string(),
            dir.display().to_string(),
            "--name".to_string(),
            cluster_name.to_string(),
        ])
        .await?;
        info!(
            "✔ Logs of cluster {:?} were exported to {:?}.",
            cluster_name, dir
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cluster::config::populate_config;
    use crate::domain::config::FleetOptions;

    fn test_config() -> ClusterConfig {
        let opts = FleetOptions {
            node_image: Some("kindest/node:v1.30.0".to_string()),
            ..Default::default()
        };
        populate_config(1, &opts).unwrap()
    }

    #[test]
    fn test_create_args_include_cluster_identity() {
        let config = test_config();
        let args = create_args(&config, Path::new("output/kind-clusters/kind-config-cluster1.yaml"));

        assert_eq!(args[0], "create");
        assert_eq!(args[1], "cluster");
        assert!(args.windows(2).any(|w| w[0] == "--name" && w[1] == "cluster1"));
        assert!(args
            .windows(2)
            .any(|w| w[0] == "--image" && w[1] == "kindest/node:v1.30.0"));
        assert!(args.contains(&"--retain".to_string()));
    }

    #[test]
    fn test_create_args_omit_image_when_unset() {
        let mut config = test_config();
        config.node_image = None;
        let args = create_args(&config, Path::new("config.yaml"));
        assert!(!args.contains(&"--image".to_string()));
    }

    #[test]
    fn test_non_empty_lines_filters_blanks() {
        let lines = non_empty_lines("cluster1\n\ncluster2\n");
        assert_eq!(lines, vec!["cluster1", "cluster2"]);
    }
}
