//! Image loading commands

use crate::cli::fleet::determine_target_clusters;
use crate::infrastructure::constants;
use crate::infrastructure::engine::DockerEngine;
use crate::infrastructure::provider::{ClusterProvider, KindProvider};
use crate::shared::tasks::{run_tasks_with_timeout, Task};
use clap::Parser;
use futures::FutureExt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
pub struct LoadImageCommand {
    /// Comma separated list of image references to load. eg: nginx:latest
    #[arg(long, short = 'm', value_delimiter = ',', required = true)]
    pub images: Vec<String>,

    /// Comma separated list of cluster names to load into. eg: cluster1,cluster3
    #[arg(long, short = 'c', value_delimiter = ',')]
    pub clusters: Vec<String>,
}

impl LoadImageCommand {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let engine = DockerEngine::new();
        let provider: Arc<dyn ClusterProvider> = Arc::new(KindProvider::new());
        let targets = determine_target_clusters(provider.as_ref(), &self.clusters).await?;

        if targets.is_empty() {
            println!("No clusters to load images into.");
            return Ok(());
        }

        let export_dir = PathBuf::from(constants::IMAGE_EXPORT_DIR);
        for image in &self.images {
            let image_id = engine.local_image_id(image).await?;
            info!("Image {:?} has local id {:?}", image, image_id);

            let archive = engine.save(image, &export_dir).await?;

            let tasks: Vec<Task> = targets
                .iter()
                .map(|name| {
                    let provider = provider.clone();
                    let name = name.clone();
                    let archive = archive.clone();
                    async move { provider.load_image_archive(&name, &archive).await }.boxed()
                })
                .collect();

            run_tasks_with_timeout(constants::LOAD_BATCH_TIMEOUT, tasks)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to load image {}: {}", image, e))?;
        }
        Ok(())
    }
}
