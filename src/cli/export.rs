//! Log export commands

use crate::cli::fleet::determine_target_clusters;
use crate::infrastructure::constants;
use crate::infrastructure::provider::{ClusterProvider, KindProvider};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct ExportLogsCommand {
    /// Comma separated list of cluster names. eg: cluster1,cluster3
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub clusters: Vec<String>,
}

impl ExportLogsCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let provider = KindProvider::new();
        let targets = determine_target_clusters(&provider, &self.clusters).await?;

        if targets.is_empty() {
            println!("No clusters to export logs from.");
            return Ok(());
        }

        let export_dir = PathBuf::from(constants::KIND_LOGS_DIR)
            .join(chrono::Local::now().format("%Y%m%d-%H%M%S").to_string());

        for name in &targets {
            provider
                .collect_logs(name, &export_dir.join(name))
                .await
                .map_err(|e| anyhow::anyhow!("Failed to export logs of {}: {}", name, e))?;
        }

        println!("✔ Logs exported to {}", export_dir.display());
        Ok(())
    }
}
