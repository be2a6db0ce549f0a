//! # Correlator
//!
//! Pairs each Certificate with the Secret holding its issued material and
//! decodes the stored leaf certificate.

use crate::constants::{ISSUER_NAME_ANNOTATION, TLS_CERT_KEY};
use crate::crd::Certificate;
use crate::decode::{decode_certificate, DecodeError};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::collections::HashMap;
use thiserror::Error;
use tracing::info;

/// Why a Certificate was left out of the affected set
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("unable to find Secret resource {secret:?}")]
    NotFound { secret: String },
    #[error("Secret {secret:?} does not contain any data for key {key:?}")]
    NoData { secret: String, key: &'static str },
    #[error("failed to decode x509 certificate data in Secret {secret:?}: {source}")]
    Decode {
        secret: String,
        #[source]
        source: DecodeError,
    },
    /// Classification outcome rather than a failure
    #[error("issuer {issuer:?} does not match filter {filter:?}")]
    Filtered {
        issuer: Option<String>,
        filter: String,
    },
}

/// Material read from a successfully decoded Secret
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelatedSecret {
    pub serial_number: String,
    /// Value of the issuer-name annotation, if present
    pub issuer_name: Option<String>,
}

/// Per-certificate correlation result
#[derive(Debug)]
pub struct Correlation {
    pub certificate: Certificate,
    pub outcome: Result<CorrelatedSecret, SkipReason>,
}

/// Lookup of Secrets by `namespace/name`
#[derive(Debug)]
pub struct SecretIndex<'a> {
    by_key: HashMap<String, &'a Secret>,
}

impl<'a> SecretIndex<'a> {
    #[must_use]
    pub fn new(secrets: &'a [Secret]) -> Self {
        let by_key = secrets
            .iter()
            .map(|s| (secret_key(&s.namespace().unwrap_or_default(), &s.name_any()), s))
            .collect();
        Self { by_key }
    }

    #[must_use]
    pub fn get(&self, namespace: &str, name: &str) -> Option<&'a Secret> {
        self.by_key.get(&secret_key(namespace, name)).copied()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.by_key.len()
    }
}

fn secret_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

/// Correlate every Certificate with its Secret, in input order
///
/// Skips are recovered locally and reported in the returned outcomes.
#[must_use]
pub fn correlate(certificates: &[Certificate], secrets: &[Secret]) -> Vec<Correlation> {
    let index = SecretIndex::new(secrets);

    certificates
        .iter()
        .map(|certificate| {
            let namespace = certificate.namespace().unwrap_or_default();
            info!(
                namespace = %namespace,
                name = %certificate.name_any(),
                "+++ Checking Secret resource for Certificate {}/{}",
                namespace,
                certificate.name_any()
            );

            let outcome = inspect_secret(&index, &namespace, &certificate.spec.secret_name);
            if let Err(reason) = &outcome {
                info!("{reason}, skipping...");
            }

            Correlation {
                certificate: certificate.clone(),
                outcome,
            }
        })
        .collect()
}

fn inspect_secret(
    index: &SecretIndex<'_>,
    namespace: &str,
    secret_name: &str,
) -> Result<CorrelatedSecret, SkipReason> {
    let secret = index
        .get(namespace, secret_name)
        .ok_or_else(|| SkipReason::NotFound {
            secret: secret_name.to_string(),
        })?;

    let cert_bytes = secret
        .data
        .as_ref()
        .and_then(|data| data.get(TLS_CERT_KEY))
        .map(|bytes| bytes.0.as_slice())
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| SkipReason::NoData {
            secret: secret_name.to_string(),
            key: TLS_CERT_KEY,
        })?;

    let decoded = decode_certificate(cert_bytes).map_err(|source| SkipReason::Decode {
        secret: secret_name.to_string(),
        source,
    })?;

    Ok(CorrelatedSecret {
        serial_number: decoded.serial_number,
        issuer_name: secret.annotations().get(ISSUER_NAME_ANNOTATION).cloned(),
    })
}
