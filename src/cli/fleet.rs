//! Fleet lifecycle commands

use crate::cli::display::{table::ClusterInfo, TableRenderer};
use crate::domain::cluster::{Cni, FleetProvisioner};
use crate::domain::config::{FleetConf, FleetOptions};
use crate::infrastructure::constants;
use crate::infrastructure::provider::{ClusterProvider, KindProvider};
use crate::shared::error::{FleetError, Result};
use clap::Parser;
use regex::Regex;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
pub struct CreateCommand {
    /// Number of clusters to create
    #[arg(long, short = 'n', default_value_t = 2)]
    pub num: u32,

    /// CNI to install
    #[arg(long, value_enum, default_value_t = Cni::Kindnet)]
    pub cni: Cni,

    /// Node docker image to use for booting the cluster
    #[arg(long, short = 'i')]
    pub image: Option<String>,

    /// Number of worker nodes per cluster
    #[arg(long, default_value_t = constants::NUM_WORKERS)]
    pub workers: u32,

    /// Retain nodes for debugging when cluster creation fails
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub retain: bool,

    /// Create clusters with overlapping cidrs
    #[arg(long, short = 'o')]
    pub overlap: bool,

    /// Amount of seconds to wait for control plane nodes to be ready
    #[arg(long, default_value_t = 300)]
    pub wait: u64,

    /// Path to a fleet defaults file (fleet.toml)
    /// If not provided, FLOTILLA_CONF_FILE is consulted
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<String>,
}

impl CreateCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let conf = if let Some(ref path) = self.config_file {
            Some(FleetConf::from(path)?)
        } else if let Ok(env_path) = std::env::var("FLOTILLA_CONF_FILE") {
            Some(FleetConf::from(&env_path)?)
        } else {
            None
        };

        let opts = self.resolve_options(conf.as_ref());

        let provisioner = FleetProvisioner::with_kind();
        let created = provisioner
            .create_fleet(&opts)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create fleet: {}", e))?;

        if !created.is_empty() {
            println!(
                "✔ Kubeconfigs: export KUBECONFIG=$(echo ~/.kube/kind-config-{}{{1..{}}} | sed 's/ /:/g')",
                constants::CLUSTER_NAME_BASE, opts.num_clusters
            );
        }
        Ok(())
    }

    /// Priority: command line > config file > defaults.
    fn resolve_options(&self, conf: Option<&FleetConf>) -> FleetOptions {
        let mut opts = FleetOptions::default();
        if let Some(conf) = conf {
            opts = conf.fleet.apply_to(opts);
        }

        if self.num != 2 {
            opts.num_clusters = self.num;
        }
        if self.cni != Cni::Kindnet {
            opts.cni = self.cni;
        }
        if self.image.is_some() {
            opts.node_image = self.image.clone();
        }
        if self.workers != constants::NUM_WORKERS {
            opts.num_workers = self.workers;
        }
        if !self.retain {
            opts.retain = false;
        }
        if self.overlap {
            opts.overlap = true;
        }
        if self.wait != 300 {
            opts.wait_for_ready = Duration::from_secs(self.wait);
        }
        opts
    }
}

#[derive(Parser, Debug)]
pub struct DestroyCommand {
    /// Comma separated list of cluster names. eg: cluster1,cluster3
    /// If omitted, every fleet cluster is destroyed
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub clusters: Vec<String>,
}

impl DestroyCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let provider = KindProvider::new();
        let targets = determine_target_clusters(&provider, &self.clusters).await?;

        if targets.is_empty() {
            println!("No clusters to destroy.");
            return Ok(());
        }

        for name in &targets {
            let kubeconfig = constants::kube_config_path(name);
            provider
                .delete(name, &kubeconfig)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to delete cluster {}: {}", name, e))?;

            let _ = std::fs::remove_file(constants::kind_config_file(name));
            let _ = std::fs::remove_file(&kubeconfig);
            println!("Cluster {} deleted successfully!", name);
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct ListCommand {}

impl ListCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let provider = KindProvider::new();

        let mut clusters = Vec::new();
        for name in provider.list_clusters().await? {
            let nodes = provider.list_nodes(&name).await.unwrap_or_default();
            clusters.push(ClusterInfo {
                kubeconfig: constants::kube_config_path(&name).display().to_string(),
                name,
                nodes: nodes.len(),
            });
        }

        let renderer = TableRenderer::new();
        println!("{}", renderer.render_clusters_list(&clusters));
        Ok(())
    }
}

/// The clusters a command should act on: the explicitly named ones, or
/// every cluster of the fleet naming scheme.
pub(crate) async fn determine_target_clusters(
    provider: &dyn ClusterProvider,
    explicit: &[String],
) -> Result<Vec<String>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }

    let fleet_name = Regex::new(&format!(r"^{}\d+$", constants::CLUSTER_NAME_BASE))
        .map_err(|e| FleetError::Config(format!("bad cluster name pattern: {}", e)))?;

    Ok(provider
        .list_clusters()
        .await?
        .into_iter()
        .filter(|name| fleet_name.is_match(name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_command() -> CreateCommand {
        CreateCommand {
            num: 2,
            cni: Cni::Kindnet,
            image: None,
            workers: constants::NUM_WORKERS,
            retain: true,
            overlap: false,
            wait: 300,
            config_file: None,
        }
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let opts = base_command().resolve_options(None);
        assert_eq!(opts.num_clusters, 2);
        assert_eq!(opts.cni, Cni::Kindnet);
        assert!(opts.retain);
        assert_eq!(opts.wait_for_ready, Duration::from_secs(300));
    }

    #[test]
    fn test_flags_override_config_file() {
        let conf: FleetConf = toml::from_str(
            r#"
            [fleet]
            num_clusters = 5
            cni = "flannel"
            "#,
        )
        .unwrap();

        let mut cmd = base_command();
        cmd.num = 3;
        cmd.cni = Cni::Calico;

        let opts = cmd.resolve_options(Some(&conf));
        assert_eq!(opts.num_clusters, 3);
        assert_eq!(opts.cni, Cni::Calico);
    }

    #[test]
    fn test_config_file_fills_unset_flags() {
        let conf: FleetConf = toml::from_str(
            r#"
            [fleet]
            num_clusters = 4
            image = "kindest/node:v1.30.0"
            overlap = true
            "#,
        )
        .unwrap();

        let opts = base_command().resolve_options(Some(&conf));
        assert_eq!(opts.num_clusters, 4);
        assert_eq!(opts.node_image.as_deref(), Some("kindest/node:v1.30.0"));
        assert!(opts.overlap);
    }
}
