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

use thiserror::Error;
pub type Result<T> = std::result::Result<T, FleetError>;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Kubernetes API error: {0}")]
    KubeApi(String),

    #[error("Cluster provider error: {0}")]
    Provider(String),

    #[error("Container engine error: {0}")]
    Engine(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid manifest: {0}")]
    Manifest(String),

    #[error("Task failed: {0}")]
    TaskFailed(String),

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl From<kube::Error> for FleetError {
    fn from(err: kube::Error) -> Self {
        FleetError::KubeApi(err.to_string())
    }
}

impl FleetError {
    pub fn provider(context: impl Into<String>) -> Self {
        Self::Provider(context.into())
    }

    pub fn engine(context: impl Into<String>) -> Self {
        Self::Engine(context.into())
    }

    pub fn config(context: impl Into<String>) -> Self {
        Self::Config(context.into())
    }

    pub fn timeout(context: impl Into<String>) -> Self {
        Self::Timeout(context.into())
    }

    /// Distinguishes "it's just slow" from "something is broken".
    pub fn is_timeout(&self) -> bool {
        matches!(self, FleetError::Timeout(_))
    }
}
