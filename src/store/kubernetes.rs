//! # Kubernetes Store
//!
//! [`CertificateStore`] backed by the Kubernetes API via kube-rs.

use super::{CertificateStore, StoreError};
use crate::crd::{Certificate, CertificateRequest};
use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    api::{Api, DeleteParams, ListParams, PostParams},
    config::{KubeConfigOptions, Kubeconfig},
    Client, ResourceExt,
};
use std::path::Path;
use tracing::debug;

/// Build a Kubernetes client
///
/// With neither `context` nor `kubeconfig` set this behaves like
/// `Client::try_default()`: in-cluster config or `$KUBECONFIG` / `~/.kube/config`.
pub async fn build_client(context: Option<&str>, kubeconfig: Option<&Path>) -> Result<Client> {
    if context.is_none() && kubeconfig.is_none() {
        return Client::try_default()
            .await
            .context("Failed to create Kubernetes client. Ensure kubeconfig is configured.");
    }

    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig '{}'", path.display()))?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &options).await
        }
        None => kube::Config::from_kubeconfig(&options).await,
    }
    .with_context(|| {
        format!(
            "Failed to load kubeconfig context '{}'",
            context.unwrap_or("<current>")
        )
    })?;

    Client::try_from(config).context("Failed to build Kubernetes client")
}

/// Live cluster store
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl std::fmt::Debug for KubeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeStore").finish_non_exhaustive()
    }
}

impl KubeStore {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Map API status codes onto the store's error kinds
fn map_api_error(
    err: kube::Error,
    kind: &'static str,
    namespace: &str,
    name: &str,
) -> StoreError {
    match err {
        kube::Error::Api(resp) if resp.code == 409 => StoreError::Conflict {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        kube::Error::Api(resp) if resp.code == 404 => StoreError::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        },
        other => StoreError::Api(other),
    }
}

#[async_trait]
impl CertificateStore for KubeStore {
    async fn list_certificates(&self) -> Result<Vec<Certificate>, StoreError> {
        let api: Api<Certificate> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn list_secrets(&self) -> Result<Vec<Secret>, StoreError> {
        let api: Api<Secret> = Api::all(self.client.clone());
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError> {
        let api: Api<Secret> = Api::namespaced(self.client.clone(), namespace);
        api.get(name)
            .await
            .map_err(|e| map_api_error(e, "Secret", namespace, name))
    }

    async fn update_secret(&self, secret: &Secret) -> Result<(), StoreError> {
        let namespace = secret.namespace().ok_or(StoreError::MissingMetadata {
            kind: "Secret",
            field: "namespace",
        })?;
        let name = secret.metadata.name.clone().ok_or(StoreError::MissingMetadata {
            kind: "Secret",
            field: "name",
        })?;

        // replace() sends the resourceVersion we read, so the API server rejects stale writes
        let api: Api<Secret> = Api::namespaced(self.client.clone(), &namespace);
        api.replace(&name, &PostParams::default(), secret)
            .await
            .map_err(|e| map_api_error(e, "Secret", &namespace, &name))?;

        debug!("Replaced Secret {}/{}", namespace, name);
        Ok(())
    }

    async fn list_certificate_requests(
        &self,
        namespace: &str,
    ) -> Result<Vec<CertificateRequest>, StoreError> {
        let api: Api<CertificateRequest> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;
        Ok(list.items)
    }

    async fn delete_certificate_request(
        &self,
        request: &CertificateRequest,
    ) -> Result<(), StoreError> {
        let namespace = request.namespace().ok_or(StoreError::MissingMetadata {
            kind: "CertificateRequest",
            field: "namespace",
        })?;
        let name = request.name_any();

        let api: Api<CertificateRequest> = Api::namespaced(self.client.clone(), &namespace);
        api.delete(&name, &DeleteParams::default())
            .await
            .map_err(|e| map_api_error(e, "CertificateRequest", &namespace, &name))?;

        debug!("Deleted CertificateRequest {}/{}", namespace, name);
        Ok(())
    }
}
