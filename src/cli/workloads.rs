//! Debug workload deployment commands

use crate::cli::fleet::determine_target_clusters;
use crate::infrastructure::constants::{self, DEFAULT_NAMESPACE};
use crate::infrastructure::kubernetes::wait::WaitConfig;
use crate::infrastructure::kubernetes::{deploy, new_cluster_client, wait};
use crate::infrastructure::provider::KindProvider;
use crate::shared::error::Result;
use crate::shared::tasks::{run_tasks_with_timeout, Task};
use clap::Parser;
use futures::FutureExt;

const NETSHOOT_MANIFEST: &str = include_str!("../../manifests/netshoot-daemonset.yaml");
const NETSHOOT_HOST_MANIFEST: &str = include_str!("../../manifests/netshoot-daemonset-host.yaml");
const NGINX_MANIFEST: &str = include_str!("../../manifests/nginx-demo.yaml");

const NGINX_DEPLOYMENT: &str = "nginx-demo";
const NGINX_SELECTOR: &str = "app=nginx-demo";
const NGINX_REPLICAS: usize = 2;

#[derive(Parser, Debug)]
pub struct DeployNetshootCommand {
    /// Deploy the pods in host network mode
    #[arg(long)]
    pub host_network: bool,

    /// Comma separated list of cluster names to deploy to. eg: cluster1,cluster3
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub clusters: Vec<String>,
}

impl DeployNetshootCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let (manifest, daemon_set) = if self.host_network {
            (NETSHOOT_HOST_MANIFEST, "netshoot-host-net")
        } else {
            (NETSHOOT_MANIFEST, "netshoot")
        };

        let provider = KindProvider::new();
        let targets = determine_target_clusters(&provider, &self.clusters).await?;

        let tasks: Vec<Task> = targets
            .iter()
            .map(|name| {
                let name = name.clone();
                async move { deploy_netshoot(name, manifest, daemon_set).await }.boxed()
            })
            .collect();

        run_tasks_with_timeout(constants::DEPLOY_BATCH_TIMEOUT, tasks)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to deploy netshoot: {}", e))?;
        Ok(())
    }
}

async fn deploy_netshoot(cluster_name: String, manifest: &str, daemon_set: &str) -> Result<()> {
    let kubeconfig = constants::kube_config_path(&cluster_name);
    let client = new_cluster_client(&cluster_name, &kubeconfig).await?;

    deploy::resources(&cluster_name, &client, manifest, "Netshoot").await?;
    wait::for_daemon_set_ready(
        &cluster_name,
        &client,
        DEFAULT_NAMESPACE,
        daemon_set,
        &WaitConfig::default(),
    )
    .await
}

#[derive(Parser, Debug)]
pub struct DeployNginxCommand {
    /// Comma separated list of cluster names to deploy to. eg: cluster1,cluster3
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub clusters: Vec<String>,
}

impl DeployNginxCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let provider = KindProvider::new();
        let targets = determine_target_clusters(&provider, &self.clusters).await?;

        let tasks: Vec<Task> = targets
            .iter()
            .map(|name| {
                let name = name.clone();
                async move { deploy_nginx(name).await }.boxed()
            })
            .collect();

        run_tasks_with_timeout(constants::DEPLOY_BATCH_TIMEOUT, tasks)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to deploy nginx-demo: {}", e))?;
        Ok(())
    }
}

async fn deploy_nginx(cluster_name: String) -> Result<()> {
    let kubeconfig = constants::kube_config_path(&cluster_name);
    let client = new_cluster_client(&cluster_name, &kubeconfig).await?;

    deploy::resources(&cluster_name, &client, NGINX_MANIFEST, "Nginx").await?;

    let cfg = WaitConfig::default();
    wait::for_deployment_ready(&cluster_name, &client, DEFAULT_NAMESPACE, NGINX_DEPLOYMENT, &cfg)
        .await?;
    wait::for_pods_running(
        &cluster_name,
        &client,
        DEFAULT_NAMESPACE,
        NGINX_SELECTOR,
        NGINX_REPLICAS,
        &cfg,
    )
    .await
}
