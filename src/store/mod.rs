//! # Backing Store
//!
//! Capability interface over the cluster API.
//!
//! Every read and write the audit and renewal flow performs goes through
//! [`CertificateStore`], so the whole pipeline can run against an in-memory
//! implementation in tests. [`KubeStore`] binds it to a live cluster.

mod kubernetes;

pub use kubernetes::{build_client, KubeStore};

use crate::crd::{is_controlled_by, Certificate, CertificateRequest};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Secret;
use thiserror::Error;

/// Failure of a single backing-store operation
#[derive(Debug, Error)]
pub enum StoreError {
    /// Optimistic-concurrency check failed: the object changed since it was read
    #[error("{kind} {namespace}/{name} was modified concurrently (stale resourceVersion)")]
    Conflict {
        kind: &'static str,
        namespace: String,
        name: String,
    },
    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: &'static str,
        namespace: String,
        name: String,
    },
    /// Object handed to a write operation lacks the metadata needed to address it
    #[error("{kind} is missing metadata.{field}")]
    MissingMetadata {
        kind: &'static str,
        field: &'static str,
    },
    #[error(transparent)]
    Api(#[from] kube::Error),
}

/// Operations the tool needs from the cluster
#[async_trait]
pub trait CertificateStore: Send + Sync {
    /// List Certificates across all namespaces
    async fn list_certificates(&self) -> Result<Vec<Certificate>, StoreError>;

    /// List Secrets across all namespaces
    async fn list_secrets(&self) -> Result<Vec<Secret>, StoreError>;

    /// Fetch the current copy of a single Secret
    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError>;

    /// Replace a Secret, failing with [`StoreError::Conflict`] if its resourceVersion is stale
    async fn update_secret(&self, secret: &Secret) -> Result<(), StoreError>;

    /// List CertificateRequests in one namespace
    async fn list_certificate_requests(
        &self,
        namespace: &str,
    ) -> Result<Vec<CertificateRequest>, StoreError>;

    async fn delete_certificate_request(
        &self,
        request: &CertificateRequest,
    ) -> Result<(), StoreError>;

    /// Whether `request` belongs to `certificate`
    fn is_owned_by(&self, request: &CertificateRequest, certificate: &Certificate) -> bool {
        is_controlled_by(request, certificate)
    }
}
