//! # Resource Fetcher
//!
//! Bulk reads of every Certificate and Secret the caller can see.

use crate::crd::Certificate;
use crate::store::{CertificateStore, StoreError};
use k8s_openapi::api::core::v1::Secret;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("error listing Certificate resources: {0}")]
    Certificates(#[source] StoreError),
    #[error("error listing Secret resources: {0}")]
    Secrets(#[source] StoreError),
}

/// Both snapshots the correlator works from
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    pub certificates: Vec<Certificate>,
    pub secrets: Vec<Secret>,
}

/// Read all Certificates, then all Secrets
///
/// Either read failing aborts the fetch; no partial inventory is returned.
pub async fn fetch_inventory(store: &dyn CertificateStore) -> Result<Inventory, FetchError> {
    let certificates = store
        .list_certificates()
        .await
        .map_err(FetchError::Certificates)?;
    info!("Found {} Certificate resources to check", certificates.len());

    let secrets = store.list_secrets().await.map_err(FetchError::Secrets)?;

    Ok(Inventory {
        certificates,
        secrets,
    })
}
