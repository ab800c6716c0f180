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

//! Create-only declarative apply for multi-document manifests.
//!
//! Documents are decoded one by one and dispatched by kind to a typed
//! create call. A document whose object already exists counts as success,
//! so re-applying a manifest is idempotent. There is no diffing, patching
//! or update; this ensures resources exist, nothing more.

use crate::infrastructure::constants::DEFAULT_NAMESPACE;
use crate::infrastructure::kubernetes::wait::{poll_until_ready, PollOutcome, WaitConfig};
use crate::shared::error::{FleetError, Result};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment};
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Service, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, Role, RoleBinding};
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::PostParams;
use kube::core::NamespaceResourceScope;
use kube::{Api, Client, ResourceExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::{debug, info, warn};

/// Deploys every supported document of `manifest` into the cluster.
///
/// Unsupported kinds are skipped with a warning. A decode failure or any
/// create error other than "already exists" aborts the whole call; already
/// created documents are not rolled back.
pub async fn resources(
    cluster_name: &str,
    client: &Client,
    manifest: &str,
    resource_name: &str,
) -> Result<()> {
    for doc in split_documents(manifest)? {
        let kind = document_kind(&doc)?;
        match kind.as_str() {
            "ServiceAccount" => create_namespaced::<ServiceAccount>(client, doc, cluster_name).await?,
            "Role" => create_namespaced::<Role>(client, doc, cluster_name).await?,
            "RoleBinding" => create_namespaced::<RoleBinding>(client, doc, cluster_name).await?,
            "ClusterRole" => create_cluster_scoped::<ClusterRole>(client, doc, cluster_name).await?,
            "ClusterRoleBinding" => {
                create_cluster_scoped::<ClusterRoleBinding>(client, doc, cluster_name).await?
            }
            "ConfigMap" => create_namespaced::<ConfigMap>(client, doc, cluster_name).await?,
            "Service" => create_namespaced::<Service>(client, doc, cluster_name).await?,
            "Pod" => create_namespaced::<Pod>(client, doc, cluster_name).await?,
            "DaemonSet" => create_namespaced::<DaemonSet>(client, doc, cluster_name).await?,
            "Deployment" => create_namespaced::<Deployment>(client, doc, cluster_name).await?,
            other => warn!(
                "Skipping unsupported resource kind {:?} in {} manifest",
                other, resource_name
            ),
        }
    }

    info!(
        "✔ All {} resources were deployed in cluster {:?}.",
        resource_name, cluster_name
    );
    Ok(())
}

/// Deploys the CustomResourceDefinitions of `manifest` and waits for each
/// to be established. Must run before any manifest that instantiates the
/// CRDs' types.
pub async fn crd_resources(cluster_name: &str, client: &Client, manifest: &str) -> Result<()> {
    let api: Api<CustomResourceDefinition> = Api::all(client.clone());
    let mut applied = Vec::new();

    for doc in split_documents(manifest)? {
        let kind = document_kind(&doc)?;
        if kind != "CustomResourceDefinition" {
            warn!(
                "Skipping resource kind {:?}: only CustomResourceDefinitions are deployed by the CRD pass",
                kind
            );
            continue;
        }

        let crd: CustomResourceDefinition = serde_yaml::from_value(doc)?;
        create_object(&api, &crd, cluster_name).await?;
        applied.push(crd.name_any());
    }

    let cfg = WaitConfig::crds();
    for name in &applied {
        let description = format!(
            "CRD {:?} to be established in cluster {:?}",
            name, cluster_name
        );
        poll_until_ready(&cfg, &description, || {
            let api = api.clone();
            let name = name.clone();
            async move {
                match api.get(&name).await {
                    Ok(crd) => crd_established_outcome(&crd),
                    Err(kube::Error::Api(ae)) if ae.code == 404 => {
                        PollOutcome::NotReady("not created yet".to_string())
                    }
                    Err(e) => PollOutcome::Error(e.into()),
                }
            }
        })
        .await?;
    }

    info!(
        "✔ All CustomResourceDefinitions were deployed in cluster {:?}.",
        cluster_name
    );
    Ok(())
}

/// Splits a manifest into its YAML documents, dropping empty ones. The
/// stream deserializer handles both explicit `---` framing and single
/// documents.
pub(crate) fn split_documents(manifest: &str) -> Result<Vec<Value>> {
    let mut docs = Vec::new();
    for document in serde_yaml::Deserializer::from_str(manifest) {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        docs.push(value);
    }
    Ok(docs)
}

pub(crate) fn document_kind(doc: &Value) -> Result<String> {
    doc.get("kind")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| FleetError::Manifest("document has no kind field".to_string()))
}

async fn create_namespaced<K>(client: &Client, doc: Value, cluster_name: &str) -> Result<()>
where
    K: kube::Resource<Scope = NamespaceResourceScope, DynamicType = ()>
        + Clone
        + std::fmt::Debug
        + Serialize
        + DeserializeOwned,
{
    let obj: K = serde_yaml::from_value(doc)?;
    let namespace = obj
        .namespace()
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string());
    let api: Api<K> = Api::namespaced(client.clone(), &namespace);
    create_object(&api, &obj, cluster_name).await
}

async fn create_cluster_scoped<K>(client: &Client, doc: Value, cluster_name: &str) -> Result<()>
where
    K: kube::Resource<DynamicType = ()> + Clone + std::fmt::Debug + Serialize + DeserializeOwned,
{
    let obj: K = serde_yaml::from_value(doc)?;
    let api: Api<K> = Api::all(client.clone());
    create_object(&api, &obj, cluster_name).await
}

async fn create_object<K>(api: &Api<K>, obj: &K, cluster_name: &str) -> Result<()>
where
    K: kube::Resource<DynamicType = ()> + Clone + std::fmt::Debug + Serialize + DeserializeOwned,
{
    let kind = K::kind(&());
    match api.create(&PostParams::default(), obj).await {
        Ok(created) => {
            info!(
                "✔ {} {:?} was deployed in cluster {:?}.",
                kind,
                created.name_any(),
                cluster_name
            );
            Ok(())
        }
        Err(kube::Error::Api(ae)) if ae.code == 409 => {
            debug!(
                "{} {:?} already exists in cluster {:?}",
                kind,
                obj.name_any(),
                cluster_name
            );
            Ok(())
        }
        Err(e) => Err(FleetError::KubeApi(format!(
            "error creating {} {:?}: {}",
            kind,
            obj.name_any(),
            e
        ))),
    }
}

fn crd_established_outcome(crd: &CustomResourceDefinition) -> PollOutcome {
    let established = crd
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Established" && c.status == "True")
        })
        .unwrap_or(false);

    if established {
        PollOutcome::Ready
    } else {
        PollOutcome::NotReady("not established yet".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
        CustomResourceDefinitionCondition, CustomResourceDefinitionStatus,
    };

    const MULTI_DOC: &str = r#"---
apiVersion: v1
kind: ServiceAccount
metadata:
  name: test-account
  namespace: kube-system
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: test-deployment
  namespace: kube-system
spec:
  replicas: 2
  selector:
    matchLabels:
      app: test
  template:
    metadata:
      labels:
        app: test
    spec:
      containers:
      - name: test
        image: quay.io/test/test:latest
"#;

    #[test]
    fn test_split_multi_document_manifest() {
        let docs = split_documents(MULTI_DOC).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(document_kind(&docs[0]).unwrap(), "ServiceAccount");
        assert_eq!(document_kind(&docs[1]).unwrap(), "Deployment");
    }

    #[test]
    fn test_split_single_document_without_framing() {
        let docs = split_documents("apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cm\n").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(document_kind(&docs[0]).unwrap(), "ConfigMap");
    }

    #[test]
    fn test_empty_documents_are_dropped() {
        let docs = split_documents("---\n---\nkind: Pod\n---\n").unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[test]
    fn test_malformed_document_is_fatal() {
        assert!(split_documents("kind: [unterminated\n").is_err());
    }

    #[test]
    fn test_document_without_kind_is_rejected() {
        let docs = split_documents("metadata:\n  name: anonymous\n").unwrap();
        assert!(document_kind(&docs[0]).is_err());
    }

    #[test]
    fn test_typed_decode_of_document() {
        let docs = split_documents(MULTI_DOC).unwrap();
        let deployment: Deployment = serde_yaml::from_value(docs[1].clone()).unwrap();
        assert_eq!(deployment.metadata.name.as_deref(), Some("test-deployment"));
        assert_eq!(deployment.spec.as_ref().unwrap().replicas, Some(2));
    }

    fn crd_with_condition(type_: &str, status: &str) -> CustomResourceDefinition {
        CustomResourceDefinition {
            status: Some(CustomResourceDefinitionStatus {
                conditions: Some(vec![CustomResourceDefinitionCondition {
                    type_: type_.to_string(),
                    status: status.to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_crd_established_predicate() {
        assert!(matches!(
            crd_established_outcome(&crd_with_condition("Established", "True")),
            PollOutcome::Ready
        ));
        assert!(matches!(
            crd_established_outcome(&crd_with_condition("Established", "False")),
            PollOutcome::NotReady(_)
        ));
        assert!(matches!(
            crd_established_outcome(&crd_with_condition("NamesAccepted", "True")),
            PollOutcome::NotReady(_)
        ));
        assert!(matches!(
            crd_established_outcome(&CustomResourceDefinition::default()),
            PollOutcome::NotReady(_)
        ));
    }
}
