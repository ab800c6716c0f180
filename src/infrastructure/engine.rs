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

//! Container engine access for image resolution and export. The binary
//! mechanics of saving and loading images are delegated to the `docker`
//! CLI.

use crate::shared::error::{FleetError, Result};
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

pub struct DockerEngine {
    binary: String,
}

impl Default for DockerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DockerEngine {
    pub fn new() -> Self {
        Self {
            binary: "docker".to_string(),
        }
    }

    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    async fn run(&self, args: &[&str]) -> Result<String> {
        debug!("Running: {} {}", self.binary, args.join(" "));
        let output = Command::new(&self.binary)
            .args(args)
            .output()
            .await
            .map_err(|e| FleetError::Engine(format!("failed to run {:?}: {}", self.binary, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FleetError::Engine(format!(
                "{} {} failed: {}",
                self.binary,
                args.join(" "),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Resolves the local id of an image reference.
    pub async fn local_image_id(&self, image: &str) -> Result<String> {
        let output = self
            .run(&["image", "inspect", "--format", "{{.Id}}", image])
            .await
            .map_err(|_| FleetError::Engine(format!("image {:?} not found locally", image)))?;

        let id = output.trim().to_string();
        if id.is_empty() {
            return Err(FleetError::Engine(format!(
                "image {:?} not found locally",
                image
            )));
        }
        Ok(id)
    }

    /// Saves the image to a tar archive under `dir` and returns its path.
    pub async fn save(&self, image: &str, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let archive = dir.join(archive_file_name(image));

        self.run(&[
            "save",
            "-o",
            archive.to_str().ok_or_else(|| {
                FleetError::Engine(format!("non UTF-8 archive path {:?}", archive))
            })?,
            image,
        ])
        .await?;

        debug!("Image {:?} saved to {:?}", image, archive);
        Ok(archive)
    }
}

fn archive_file_name(image: &str) -> String {
    format!("{}.tar", image.replace(['/', ':'], "_"))
}
