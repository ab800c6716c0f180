// CLI command definitions

use super::export::ExportLogsCommand;
use super::fleet::{CreateCommand, DestroyCommand, ListCommand};
use super::images::LoadImageCommand;
use super::workloads::{DeployNetshootCommand, DeployNginxCommand};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "flotilla-kube",
    version,
    about = "Multi-cluster kind environments for network testing",
    long_about = "Creates and manages fleets of kind clusters with a chosen CNI, debug workloads and local image loading"
)]
pub struct CliArgs {
    /// Set log level to debug
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Create multiple kubernetes clusters using container 'nodes'
    Create(CreateCommand),

    /// Destroy clusters and their generated artifacts
    Destroy(DestroyCommand),

    /// Deploy debug workloads to the clusters
    #[command(subcommand)]
    Deploy(DeployCommands),

    /// Load resources into the clusters
    #[command(subcommand)]
    Load(LoadCommands),

    /// Export cluster artifacts
    #[command(subcommand)]
    Export(ExportCommands),

    /// List the known clusters
    List(ListCommand),
}

#[derive(clap::Subcommand, Debug)]
pub enum DeployCommands {
    /// Deploy netshoot pods for debugging
    Netshoot(DeployNetshootCommand),

    /// Deploy the nginx demo application service and pods
    NginxDemo(DeployNginxCommand),
}

impl DeployCommands {
    pub async fn execute(&self) -> anyhow::Result<()> {
        match self {
            Self::Netshoot(cmd) => cmd.execute().await,
            Self::NginxDemo(cmd) => cmd.execute().await,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum LoadCommands {
    /// Load local container images into cluster nodes
    Image(LoadImageCommand),
}

impl LoadCommands {
    pub async fn execute(&self) -> anyhow::Result<()> {
        match self {
            Self::Image(cmd) => cmd.execute().await,
        }
    }
}

#[derive(clap::Subcommand, Debug)]
pub enum ExportCommands {
    /// Export kind cluster logs
    Logs(ExportLogsCommand),
}

impl ExportCommands {
    pub async fn execute(&self) -> anyhow::Result<()> {
        match self {
            Self::Logs(cmd) => cmd.execute().await,
        }
    }
}
