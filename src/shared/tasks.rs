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

//! Concurrent task batches with first-error-wins semantics and a soft timeout.

use crate::shared::error::{FleetError, Result};
use futures::future::BoxFuture;
use std::time::Duration;
use tokio::sync::mpsc;

/// An independent fallible operation. Owned by the batch that runs it.
pub type Task = BoxFuture<'static, Result<()>>;

/// Runs every task on its own tokio task and waits for the batch to drain.
///
/// Returns `Ok(())` only once every task has completed without error. The
/// first error observed is returned as soon as it arrives; the remaining
/// tasks keep running detached. If `timeout` elapses before the batch
/// completes, a `FleetError::Timeout` is returned instead; in-flight tasks
/// are not cancelled, the deadline only bounds the wait.
pub async fn run_tasks_with_timeout(timeout: Duration, tasks: Vec<Task>) -> Result<()> {
    if tasks.is_empty() {
        return Ok(());
    }

    let total = tasks.len();
    let (tx, mut rx) = mpsc::channel(total);

    for task in tasks {
        let tx = tx.clone();
        let handle = tokio::spawn(task);
        tokio::spawn(async move {
            let result = match handle.await {
                Ok(result) => result,
                Err(e) => Err(FleetError::TaskFailed(format!("task panicked: {}", e))),
            };
            let _ = tx.send(result).await;
        });
    }
    drop(tx);

    let drain = async {
        let mut completed = 0;
        while completed < total {
            match rx.recv().await {
                Some(result) => {
                    result?;
                    completed += 1;
                }
                None => break,
            }
        }
        Ok(())
    };

    match tokio::time::timeout(timeout, drain).await {
        Ok(result) => result,
        Err(_) => Err(FleetError::Timeout(format!(
            "timed out after {:?} waiting for {} tasks to complete",
            timeout, total
        ))),
    }
}
