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

//! Polling for cluster-side resources to become ready.
//!
//! Every waiter re-reads its target on a fixed period until the readiness
//! predicate holds or the deadline expires. Transient read errors (including
//! not-found) count as "not ready yet": a resource that does not exist yet
//! is indistinguishable from one that has not finished rolling out.

use crate::shared::error::{FleetError, Result};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::{Api, Client};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

/// Explicit polling tunables, threaded into every waiter.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub timeout: Duration,
    pub retry_period: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: crate::infrastructure::constants::WAIT_DURATION_RESOURCES,
            retry_period: crate::infrastructure::constants::WAIT_RETRY_PERIOD,
        }
    }
}

impl WaitConfig {
    pub fn new(timeout: Duration, retry_period: Duration) -> Self {
        Self {
            timeout,
            retry_period,
        }
    }

    /// Short window used for CRD establishment.
    pub fn crds() -> Self {
        Self {
            timeout: crate::infrastructure::constants::WAIT_DURATION_CRDS,
            retry_period: crate::infrastructure::constants::WAIT_RETRY_PERIOD_CRDS,
        }
    }
}

/// The result of one poll tick.
pub enum PollOutcome {
    Ready,
    NotReady(String),
    Error(FleetError),
}

/// Invokes `check` every `retry_period` until it reports ready or the
/// deadline expires. Only the deadline terminates the loop on the failure
/// side; check errors are logged at debug level and retried.
pub async fn poll_until_ready<F, Fut>(cfg: &WaitConfig, description: &str, mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PollOutcome>,
{
    info!("Waiting up to {:?} for {} ...", cfg.timeout, description);
    let deadline = Instant::now() + cfg.timeout;

    loop {
        match check().await {
            PollOutcome::Ready => return Ok(()),
            PollOutcome::NotReady(detail) => {
                info!("Still waiting for {}: {}", description, detail);
            }
            PollOutcome::Error(err) => {
                debug!("Transient error while checking {}: {}", description, err);
            }
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(FleetError::Timeout(format!(
                "timed out after {:?} waiting for {}",
                cfg.timeout, description
            )));
        }
        sleep(cfg.retry_period.min(deadline - now)).await;
    }
}

/// Waits for a deployment roll out: every desired replica reports ready.
pub async fn for_deployment_ready(
    cluster_name: &str,
    client: &Client,
    namespace: &str,
    deployment_name: &str,
    cfg: &WaitConfig,
) -> Result<()> {
    let api: Api<Deployment> = Api::namespaced(client.clone(), namespace);
    let description = format!(
        "deployment {:?} roll out in cluster {:?}",
        deployment_name, cluster_name
    );

    poll_until_ready(cfg, &description, || {
        let api = api.clone();
        let name = deployment_name.to_owned();
        async move {
            match api.get(&name).await {
                Ok(deployment) => deployment_outcome(&deployment),
                Err(kube::Error::Api(ae)) if ae.code == 404 => {
                    PollOutcome::NotReady("not created yet".to_string())
                }
                Err(e) => PollOutcome::Error(e.into()),
            }
        }
    })
    .await?;

    info!(
        "✔ Deployment {:?} successfully rolled out in cluster {:?}",
        deployment_name, cluster_name
    );
    Ok(())
}

/// Waits for a daemon set roll out on every scheduled node.
pub async fn for_daemon_set_ready(
    cluster_name: &str,
    client: &Client,
    namespace: &str,
    daemon_set_name: &str,
    cfg: &WaitConfig,
) -> Result<()> {
    let api: Api<DaemonSet> = Api::namespaced(client.clone(), namespace);
    let description = format!(
        "daemon set {:?} roll out in cluster {:?}",
        daemon_set_name, cluster_name
    );

    poll_until_ready(cfg, &description, || {
        let api = api.clone();
        let name = daemon_set_name.to_owned();
        async move {
            match api.get(&name).await {
                Ok(daemon_set) => daemon_set_outcome(&daemon_set),
                Err(kube::Error::Api(ae)) if ae.code == 404 => {
                    PollOutcome::NotReady("not created yet".to_string())
                }
                Err(e) => PollOutcome::Error(e.into()),
            }
        }
    })
    .await?;

    info!(
        "✔ Daemon set {:?} successfully rolled out in cluster {:?}",
        daemon_set_name, cluster_name
    );
    Ok(())
}

/// Waits until `replicas` pods matching the label selector are running.
pub async fn for_pods_running(
    cluster_name: &str,
    client: &Client,
    namespace: &str,
    selector: &str,
    replicas: usize,
    cfg: &WaitConfig,
) -> Result<()> {
    let api: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let description = format!(
        "{} running pods with label {:?} in namespace {:?} of cluster {:?}",
        replicas, selector, namespace, cluster_name
    );

    poll_until_ready(cfg, &description, || {
        let api = api.clone();
        let selector = selector.to_owned();
        async move {
            let lp = ListParams::default()
                .labels(&selector)
                .fields("status.phase=Running");
            match api.list(&lp).await {
                Ok(pods) => pods_outcome(pods.items.len(), replicas),
                Err(e) => PollOutcome::Error(e.into()),
            }
        }
    })
    .await?;

    info!(
        "✔ All pods with label {:?} in namespace {:?} are running in cluster {:?}",
        selector, namespace, cluster_name
    );
    Ok(())
}

fn deployment_outcome(deployment: &Deployment) -> PollOutcome {
    let desired = deployment.spec.as_ref().and_then(|s| s.replicas).unwrap_or(1);
    let ready = deployment
        .status
        .as_ref()
        .and_then(|s| s.ready_replicas)
        .unwrap_or(0);

    if ready == desired {
        PollOutcome::Ready
    } else {
        PollOutcome::NotReady(format!("{} out of {} replicas ready", ready, desired))
    }
}

fn daemon_set_outcome(daemon_set: &DaemonSet) -> PollOutcome {
    match daemon_set.status.as_ref() {
        Some(status) if status.number_ready == status.desired_number_scheduled => PollOutcome::Ready,
        Some(status) => PollOutcome::NotReady(format!(
            "{} out of {} replicas ready",
            status.number_ready, status.desired_number_scheduled
        )),
        None => PollOutcome::NotReady("no status reported yet".to_string()),
    }
}

fn pods_outcome(running: usize, expected: usize) -> PollOutcome {
    if running == expected {
        PollOutcome::Ready
    } else {
        PollOutcome::NotReady(format!("{} out of {} pods running", running, expected))
    }
}
