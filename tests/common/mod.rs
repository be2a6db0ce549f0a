//! Common test utilities
//!
//! An in-memory [`CertificateStore`] that mimics the API server behaviour the
//! renewal flow depends on, plus certificate and resource fixtures.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use force_renew::constants::{ISSUER_NAME_ANNOTATION, TLS_CERT_KEY};
use force_renew::crd::{
    Certificate, CertificateRequest, CertificateRequestSpec, CertificateRequestStatus,
    CertificateSpec, IssuerRef,
};
use force_renew::renewal::Sleeper;
use force_renew::store::{CertificateStore, StoreError};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::ByteString;
use kube::{Resource, ResourceExt};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// Decimal rendering of the serial produced by [`pem_with_serial`]
pub fn serial_of(n: u8) -> String {
    (0x1000_u32 + u32::from(n)).to_string()
}

/// Self-signed PEM certificate with serial `0x10nn`
pub fn pem_with_serial(n: u8) -> Vec<u8> {
    let key = rcgen::KeyPair::generate().unwrap();
    let mut params = rcgen::CertificateParams::new(vec!["example.com".to_string()]).unwrap();
    params.serial_number = Some(rcgen::SerialNumber::from_slice(&[0x10, n]));
    params.self_signed(&key).unwrap().pem().into_bytes()
}

pub fn certificate(namespace: &str, name: &str) -> Certificate {
    let mut cert = Certificate::new(
        name,
        CertificateSpec {
            secret_name: format!("{name}-tls"),
            issuer_ref: Some(IssuerRef {
                name: "letsencrypt-prod".to_string(),
                kind: Some("ClusterIssuer".to_string()),
                group: None,
            }),
            common_name: None,
            dns_names: vec![format!("{name}.example.com")],
        },
    );
    cert.metadata.namespace = Some(namespace.to_string());
    cert.metadata.uid = Some(format!("uid-{namespace}-{name}"));
    cert
}

/// The Secret `cert` writes to, holding `pem` under `tls.crt`
pub fn tls_secret(cert: &Certificate, pem: Vec<u8>, issuer: Option<&str>) -> Secret {
    let mut secret = empty_secret(cert);
    secret.data = Some(BTreeMap::from([(TLS_CERT_KEY.to_string(), ByteString(pem))]));
    if let Some(issuer) = issuer {
        secret
            .annotations_mut()
            .insert(ISSUER_NAME_ANNOTATION.to_string(), issuer.to_string());
    }
    secret
}

/// The Secret `cert` writes to, without any certificate data
pub fn empty_secret(cert: &Certificate) -> Secret {
    let mut secret = Secret::default();
    secret.metadata.namespace = cert.namespace();
    secret.metadata.name = Some(cert.spec.secret_name.clone());
    secret.metadata.resource_version = Some("1".to_string());
    secret
}

/// A CertificateRequest controlled by `cert`
pub fn owned_request(cert: &Certificate, name: &str, complete: bool) -> CertificateRequest {
    let mut request = CertificateRequest::new(name, CertificateRequestSpec::default());
    request.metadata.namespace = cert.namespace();
    request.metadata.owner_references = cert.controller_owner_ref(&()).map(|owner| vec![owner]);
    if complete {
        request.status = Some(CertificateRequestStatus {
            certificate: Some("LS0tLS1CRUdJTi...".to_string()),
        });
    }
    request
}

fn key(namespace: Option<String>, name: &str) -> String {
    format!("{}/{}", namespace.unwrap_or_default(), name)
}

/// Error returned by a failing list call
fn list_failure(kind: &'static str, namespace: &str) -> StoreError {
    StoreError::NotFound {
        kind,
        namespace: namespace.to_string(),
        name: "*".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct State {
    pub certificates: Vec<Certificate>,
    pub secrets: Vec<Secret>,
    pub requests: Vec<CertificateRequest>,
    /// `namespace/name` of every deleted CertificateRequest
    pub deleted: Vec<String>,
    /// Every Secret successfully written, in order
    pub updated: Vec<Secret>,
    /// Every delete fails
    pub fail_delete: bool,
    /// Listing Certificates fails
    pub fail_list_certificates: bool,
    /// Listing Secrets fails
    pub fail_list_secrets: bool,
    /// Listing CertificateRequests fails
    pub fail_list_requests: bool,
    /// Another writer bumps a Secret's resourceVersion right after each read
    pub concurrent_writer: bool,
    /// When set, a Secret update makes cert-manager create an owned request
    /// that becomes visible on the n-th CertificateRequest list afterwards
    pub issue_after_lists: Option<u32>,
    pending: Vec<(u32, CertificateRequest)>,
}

/// In-memory cluster
#[derive(Debug, Default)]
pub struct MemoryStore {
    pub state: Mutex<State>,
}

impl MemoryStore {
    pub fn new(certificates: Vec<Certificate>, secrets: Vec<Secret>) -> Self {
        Self {
            state: Mutex::new(State {
                certificates,
                secrets,
                ..State::default()
            }),
        }
    }

    pub fn with(self, f: impl FnOnce(&mut State)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn deleted(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted.clone()
    }

    pub fn updated(&self) -> Vec<Secret> {
        self.state.lock().unwrap().updated.clone()
    }

    /// Total mutations performed against the store
    pub fn mutations(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.deleted.len() + state.updated.len()
    }
}

#[async_trait]
impl CertificateStore for MemoryStore {
    async fn list_certificates(&self) -> Result<Vec<Certificate>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_list_certificates {
            return Err(list_failure("Certificate", ""));
        }
        Ok(state.certificates.clone())
    }

    async fn list_secrets(&self) -> Result<Vec<Secret>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_list_secrets {
            return Err(list_failure("Secret", ""));
        }
        Ok(state.secrets.clone())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Secret, StoreError> {
        let mut state = self.state.lock().unwrap();
        let concurrent = state.concurrent_writer;
        let stored = state
            .secrets
            .iter_mut()
            .find(|s| s.namespace().as_deref() == Some(namespace) && s.name_any() == name)
            .ok_or_else(|| StoreError::NotFound {
                kind: "Secret",
                namespace: namespace.to_string(),
                name: name.to_string(),
            })?;

        let copy = stored.clone();
        if concurrent {
            let version: u64 = stored.resource_version().unwrap_or_default().parse().unwrap_or(0);
            stored.metadata.resource_version = Some((version + 1).to_string());
        }
        Ok(copy)
    }

    async fn update_secret(&self, secret: &Secret) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let namespace = secret.namespace().unwrap_or_default();
        let name = secret.name_any();

        let stored = state
            .secrets
            .iter_mut()
            .find(|s| s.namespace().as_deref() == Some(namespace.as_str()) && s.name_any() == name)
            .ok_or_else(|| StoreError::NotFound {
                kind: "Secret",
                namespace: namespace.clone(),
                name: name.clone(),
            })?;

        if stored.resource_version() != secret.resource_version() {
            return Err(StoreError::Conflict {
                kind: "Secret",
                namespace,
                name,
            });
        }

        let version: u64 = stored.resource_version().unwrap_or_default().parse().unwrap_or(0);
        *stored = secret.clone();
        stored.metadata.resource_version = Some((version + 1).to_string());
        let written = stored.clone();
        state.updated.push(written);

        if let Some(after) = state.issue_after_lists {
            let owner = state
                .certificates
                .iter()
                .find(|c| c.namespace().as_deref() == Some(namespace.as_str()) && c.spec.secret_name == name)
                .cloned();
            if let Some(cert) = owner {
                let request = owned_request(&cert, &format!("{}-issued", cert.name_any()), false);
                state.pending.push((after, request));
            }
        }
        Ok(())
    }

    async fn list_certificate_requests(
        &self,
        namespace: &str,
    ) -> Result<Vec<CertificateRequest>, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_list_requests {
            return Err(list_failure("CertificateRequest", namespace));
        }

        let mut still_pending = Vec::new();
        for (remaining, request) in std::mem::take(&mut state.pending) {
            if remaining <= 1 {
                state.requests.push(request);
            } else {
                still_pending.push((remaining - 1, request));
            }
        }
        state.pending = still_pending;

        Ok(state
            .requests
            .iter()
            .filter(|r| r.namespace().as_deref() == Some(namespace))
            .cloned()
            .collect())
    }

    async fn delete_certificate_request(
        &self,
        request: &CertificateRequest,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        let namespace = request.namespace().unwrap_or_default();
        let name = request.name_any();

        if state.fail_delete {
            return Err(StoreError::NotFound {
                kind: "CertificateRequest",
                namespace,
                name,
            });
        }

        state
            .requests
            .retain(|r| !(r.namespace().as_deref() == Some(namespace.as_str()) && r.name_any() == name));
        state.deleted.push(key(Some(namespace), &name));
        Ok(())
    }
}

/// Records requested delays instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn total(&self) -> Duration {
        self.slept.lock().unwrap().iter().sum()
    }

    pub fn calls(&self) -> usize {
        self.slept.lock().unwrap().len()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}
