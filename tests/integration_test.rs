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

#[cfg(test)]
mod tests {
    use flotilla_kube::infrastructure::kubernetes::deploy;
    use flotilla_kube::infrastructure::kubernetes::wait::poll_until_ready;
    use flotilla_kube::infrastructure::provider::generate_config_file;
    use flotilla_kube::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_fleet_configs_are_disjoint_and_renderable() {
        let opts = FleetOptions {
            num_clusters: 3,
            cni: Cni::Flannel,
            ..Default::default()
        };

        let configs: Vec<ClusterConfig> = (1..=opts.num_clusters)
            .map(|i| populate_config(i, &opts).expect("Failed to populate config"))
            .collect();

        for (i, a) in configs.iter().enumerate() {
            for b in configs.iter().skip(i + 1) {
                assert_ne!(a.pod_subnet, b.pod_subnet);
                assert_ne!(a.service_subnet, b.service_subnet);
            }
        }

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        for config in &configs {
            let path = generate_config_file(config, dir.path()).expect("Failed to render config");
            let raw = std::fs::read_to_string(path).expect("Failed to read config");
            let value: serde_yaml::Value = serde_yaml::from_str(&raw).expect("Invalid YAML");

            assert_eq!(
                value["networking"]["podSubnet"].as_str().unwrap(),
                config.pod_subnet
            );
            assert_eq!(value["networking"]["disableDefaultCNI"].as_bool(), Some(true));
            assert_eq!(value["nodes"].as_sequence().unwrap().len(), 3);
        }
    }

    #[tokio::test]
    async fn test_parallel_polling_composes_with_task_batches() {
        // Callers needing parallel polling across clusters fan the blocking
        // waiters out through a task batch.
        let cfg = WaitConfig::new(Duration::from_secs(5), Duration::from_millis(10));

        let tasks: Vec<Task> = (0..3)
            .map(|_| {
                let cfg = cfg.clone();
                let ready = Arc::new(AtomicBool::new(false));

                let flag = ready.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    flag.store(true, Ordering::SeqCst);
                });

                async move {
                    poll_until_ready(&cfg, "a background resource", || {
                        let ready = ready.clone();
                        async move {
                            if ready.load(Ordering::SeqCst) {
                                PollOutcome::Ready
                            } else {
                                PollOutcome::NotReady("not flipped yet".to_string())
                            }
                        }
                    })
                    .await
                }
                .boxed()
            })
            .collect();

        let result = run_tasks_with_timeout(Duration::from_secs(10), tasks).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_timeout_is_distinguishable_from_task_failure() {
        let slow: Vec<Task> = vec![async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        }
        .boxed()];
        let err = run_tasks_with_timeout(Duration::from_millis(100), slow)
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        let failing: Vec<Task> =
            vec![async { Err(FleetError::Provider("broken".to_string())) }.boxed()];
        let err = run_tasks_with_timeout(Duration::from_secs(5), failing)
            .await
            .unwrap_err();
        assert!(!err.is_timeout());
    }

    const CONFIGMAP_MANIFEST: &str = r#"---
apiVersion: v1
kind: ConfigMap
metadata:
  name: flotilla-test-cm
  namespace: default
data:
  foo: bar
"#;

    const CONFIGMAP_MANIFEST_CHANGED: &str = r#"---
apiVersion: v1
kind: ConfigMap
metadata:
  name: flotilla-test-cm
  namespace: default
data:
  foo: baz
"#;

    #[tokio::test]
    #[ignore] // Requires a kind cluster on the default kubeconfig
    async fn test_apply_is_create_only_and_idempotent() {
        use k8s_openapi::api::core::v1::ConfigMap;
        use kube::{Api, Client};

        let client = Client::try_default().await.expect("No cluster available");

        deploy::resources("test", &client, CONFIGMAP_MANIFEST, "Test")
            .await
            .expect("First apply failed");

        // Re-applying must succeed without overwriting the original fields.
        deploy::resources("test", &client, CONFIGMAP_MANIFEST_CHANGED, "Test")
            .await
            .expect("Second apply failed");

        let api: Api<ConfigMap> = Api::namespaced(client.clone(), "default");
        let cm = api.get("flotilla-test-cm").await.expect("ConfigMap missing");
        assert_eq!(cm.data.unwrap().get("foo").map(String::as_str), Some("bar"));

        let _ = api
            .delete("flotilla-test-cm", &kube::api::DeleteParams::default())
            .await;
    }

    #[tokio::test]
    #[ignore] // Requires a kind cluster on the default kubeconfig
    async fn test_unsupported_kinds_are_skipped_without_error() {
        use k8s_openapi::api::core::v1::ConfigMap;
        use kube::{Api, Client};

        let manifest = r#"---
apiVersion: policy/v1beta1
kind: PodSecurityPolicy
metadata:
  name: flotilla-test-psp
spec:
  privileged: true
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: flotilla-test-skip-cm
  namespace: default
data:
  foo: bar
"#;

        let client = Client::try_default().await.expect("No cluster available");
        deploy::resources("test", &client, manifest, "Test")
            .await
            .expect("Apply with unsupported kind failed");

        let api: Api<ConfigMap> = Api::namespaced(client.clone(), "default");
        assert!(api.get("flotilla-test-skip-cm").await.is_ok());

        let _ = api
            .delete("flotilla-test-skip-cm", &kube::api::DeleteParams::default())
            .await;
    }

    #[tokio::test]
    #[ignore] // Requires a kind cluster on the default kubeconfig
    async fn test_crds_are_established_before_the_call_returns() {
        use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
        use kube::{Api, Client};

        let manifest = r#"---
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: testconfigs.crd.flotilla.dev
spec:
  group: crd.flotilla.dev
  scope: Cluster
  names:
    kind: TestConfig
    plural: testconfigs
    singular: testconfig
  versions:
    - name: v1
      served: true
      storage: true
      schema:
        openAPIV3Schema:
          type: object
          x-kubernetes-preserve-unknown-fields: true
"#;

        let client = Client::try_default().await.expect("No cluster available");
        deploy::crd_resources("test", &client, manifest)
            .await
            .expect("CRD apply failed");

        // Establishment is part of the CRD pass, so instances of the type
        // can be created as soon as it returns.
        let api: Api<CustomResourceDefinition> = Api::all(client.clone());
        let crd = api
            .get("testconfigs.crd.flotilla.dev")
            .await
            .expect("CRD missing");
        let established = crd
            .status
            .unwrap()
            .conditions
            .unwrap()
            .iter()
            .any(|c| c.type_ == "Established" && c.status == "True");
        assert!(established);

        let _ = api
            .delete(
                "testconfigs.crd.flotilla.dev",
                &kube::api::DeleteParams::default(),
            )
            .await;
    }

    #[tokio::test]
    #[ignore] // Requires kind and docker on the host
    async fn test_create_single_cluster_fleet() {
        let opts = FleetOptions {
            num_clusters: 1,
            cni: Cni::Kindnet,
            wait_for_ready: Duration::from_secs(120),
            ..Default::default()
        };

        let provisioner = FleetProvisioner::with_kind();
        let created = provisioner
            .create_fleet(&opts)
            .await
            .expect("Fleet creation failed");
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "cluster1");
    }
}
