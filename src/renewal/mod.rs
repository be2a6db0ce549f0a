//! # Renewal Driver
//!
//! Forces a single Certificate through cert-manager's issuance pipeline.
//!
//! Each renewal walks `CancelStale → Annotate → AwaitRequest`:
//!
//! 1. **CancelStale** - owned CertificateRequests are inspected. An incomplete one
//!    means an issuance is already running, so the renewal stops without touching
//!    anything. Completed ones are deleted so they cannot short-circuit the new
//!    issuance.
//! 2. **Annotate** - a fresh copy of the Secret is read and its issuer-name
//!    annotation set to the force-renewal sentinel. cert-manager treats this as an
//!    issuerRef change and re-issues once.
//! 3. **AwaitRequest** - CertificateRequests are polled until one owned by the
//!    Certificate shows up, or the poll ceiling is reached.
//!
//! Any failure is returned as a [`RenewalError`]; the caller aborts the run.

mod poll;

pub use poll::{poll_until, PollError, PollSettings, Sleeper, TokioSleeper};

use crate::constants::{FORCE_RENEWAL_SENTINEL, ISSUER_NAME_ANNOTATION};
use crate::crd::Certificate;
use crate::store::{CertificateStore, StoreError};
use kube::ResourceExt;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum RenewalError {
    #[error("failed to list CertificateRequests in namespace {namespace}: {source}")]
    ListRequests {
        namespace: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to delete old CertificateRequest {namespace}/{name}: {source}")]
    DeleteRequest {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to retrieve up-to-date copy of Secret {namespace}/{name}: {source}")]
    GetSecret {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("failed to update Secret {namespace}/{name}: {source}")]
    UpdateSecret {
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },
    #[error(
        "timed out after {waited:?} waiting for a new CertificateRequest for Certificate {namespace}/{name}"
    )]
    Timeout {
        namespace: String,
        name: String,
        waited: Duration,
    },
}

/// How a renewal that did not fail ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenewalOutcome {
    /// Re-issuance was triggered and cert-manager created `request`
    Triggered { deleted: Vec<String>, request: String },
    /// An issuance was already in flight; nothing was changed
    AlreadyInProgress { request: String },
}

/// Result of the CancelStale step
enum StaleRequests {
    InProgress(String),
    Cleared(Vec<String>),
}

/// Drives renewals one Certificate at a time
pub struct RenewalDriver<'a> {
    store: &'a dyn CertificateStore,
    sleeper: &'a dyn Sleeper,
    poll: PollSettings,
}

impl std::fmt::Debug for RenewalDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenewalDriver")
            .field("poll", &self.poll)
            .finish_non_exhaustive()
    }
}

impl<'a> RenewalDriver<'a> {
    #[must_use]
    pub fn new(
        store: &'a dyn CertificateStore,
        sleeper: &'a dyn Sleeper,
        poll: PollSettings,
    ) -> Self {
        Self {
            store,
            sleeper,
            poll,
        }
    }

    /// Force re-issuance of `certificate`
    pub async fn renew(&self, certificate: &Certificate) -> Result<RenewalOutcome, RenewalError> {
        let deleted = match self.cancel_stale(certificate).await? {
            StaleRequests::InProgress(request) => {
                return Ok(RenewalOutcome::AlreadyInProgress { request });
            }
            StaleRequests::Cleared(deleted) => deleted,
        };

        self.annotate(certificate).await?;

        info!(
            "Triggered renewal of Certificate - waiting for new CertificateRequest resource to be created..."
        );
        let request = self.await_request(certificate).await?;

        Ok(RenewalOutcome::Triggered { deleted, request })
    }

    async fn cancel_stale(&self, certificate: &Certificate) -> Result<StaleRequests, RenewalError> {
        let namespace = certificate.namespace().unwrap_or_default();
        let requests = self
            .store
            .list_certificate_requests(&namespace)
            .await
            .map_err(|source| RenewalError::ListRequests {
                namespace: namespace.clone(),
                source,
            })?;

        let owned: Vec<_> = requests
            .iter()
            .filter(|r| self.store.is_owned_by(r, certificate))
            .collect();

        // Nothing is deleted while any issuance is still running
        if let Some(running) = owned.iter().find(|r| !r.is_complete()) {
            let name = running.name_any();
            info!(
                "Found existing CertificateRequest {}/{} for Certificate - skipping triggering a renewal...",
                namespace, name
            );
            return Ok(StaleRequests::InProgress(name));
        }

        let mut deleted = Vec::new();
        for request in owned {
            let name = request.name_any();

            if let Err(source) = self.store.delete_certificate_request(request).await {
                warn!(
                    "Failed to delete old CertificateRequest {}/{} for Certificate",
                    namespace, name
                );
                return Err(RenewalError::DeleteRequest {
                    namespace,
                    name,
                    source,
                });
            }

            info!(
                "Deleted old CertificateRequest {}/{} for Certificate",
                namespace, name
            );
            deleted.push(name);
        }

        Ok(StaleRequests::Cleared(deleted))
    }

    async fn annotate(&self, certificate: &Certificate) -> Result<(), RenewalError> {
        let namespace = certificate.namespace().unwrap_or_default();
        let name = certificate.spec.secret_name.clone();

        // The snapshot from the audit may be stale; always mutate a fresh copy
        let mut secret = match self.store.get_secret(&namespace, &name).await {
            Ok(secret) => secret,
            Err(source) => {
                warn!("Failed to retrieve up-to-date copy of existing Secret resource for Certificate: {source}");
                return Err(RenewalError::GetSecret {
                    namespace,
                    name,
                    source,
                });
            }
        };

        secret.annotations_mut().insert(
            ISSUER_NAME_ANNOTATION.to_string(),
            FORCE_RENEWAL_SENTINEL.to_string(),
        );

        if let Err(source) = self.store.update_secret(&secret).await {
            warn!("Failed to update Secret resource for Certificate: {source}");
            return Err(RenewalError::UpdateSecret {
                namespace,
                name,
                source,
            });
        }
        Ok(())
    }

    async fn await_request(&self, certificate: &Certificate) -> Result<String, RenewalError> {
        let namespace = certificate.namespace().unwrap_or_default();

        let store = self.store;
        let ns = namespace.as_str();
        let result = poll_until(self.sleeper, self.poll, move || async move {
            let requests = store.list_certificate_requests(ns).await?;
            Ok::<_, StoreError>(
                requests
                    .iter()
                    .find(|r| store.is_owned_by(r, certificate))
                    .map(ResourceExt::name_any),
            )
        })
        .await;

        match result {
            Ok(request) => {
                info!(
                    "CertificateRequest {}/{} found, renewal in progress!",
                    namespace, request
                );
                Ok(request)
            }
            Err(PollError::Timeout(waited)) => {
                warn!("Failed to wait for new CertificateRequest to be created: timed out after {waited:?}");
                Err(RenewalError::Timeout {
                    namespace,
                    name: certificate.name_any(),
                    waited,
                })
            }
            Err(PollError::Check(source)) => {
                warn!("Failed to wait for new CertificateRequest to be created: {source}");
                Err(RenewalError::ListRequests { namespace, source })
            }
        }
    }
}
