//! # CertificateRequest
//!
//! A single issuance attempt created by cert-manager for a `Certificate`.

use super::{Certificate, IssuerRef};
use kube::ResourceExt;
use serde::{Deserialize, Serialize};

/// cert-manager `CertificateRequest`
///
/// Created by cert-manager when a Certificate needs (re-)issuance and owned by
/// exactly one Certificate through a controller owner reference. This tool
/// never creates them; it only deletes completed ones.
#[derive(
    kube::CustomResource, Debug, Clone, Default, Deserialize, Serialize, schemars::JsonSchema,
)]
#[kube(
    kind = "CertificateRequest",
    group = "cert-manager.io",
    version = "v1",
    namespaced,
    status = "CertificateRequestStatus",
    shortname = "cr"
)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestSpec {
    /// PEM-encoded CSR, base64 encoded
    #[serde(default)]
    pub request: String,
    #[serde(default)]
    pub issuer_ref: Option<IssuerRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateRequestStatus {
    /// Signed certificate, base64 encoded. Empty until issuance completes.
    #[serde(default)]
    pub certificate: Option<String>,
}

impl CertificateRequest {
    /// Whether the issuer has attached a signed certificate
    ///
    /// A request without one is still in flight.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.certificate.as_deref())
            .is_some_and(|c| !c.is_empty())
    }
}

/// Whether `request` is controlled by `certificate`
///
/// True when the request carries a controller owner reference whose UID equals
/// the certificate's UID. A certificate without a UID controls nothing.
#[must_use]
pub fn is_controlled_by(request: &CertificateRequest, certificate: &Certificate) -> bool {
    let Some(uid) = certificate.uid().filter(|uid| !uid.is_empty()) else {
        return false;
    };
    request
        .owner_references()
        .iter()
        .find(|owner| owner.controller == Some(true))
        .is_some_and(|owner| owner.uid == uid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::CertificateSpec;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;

    fn certificate(uid: Option<&str>) -> Certificate {
        let mut cert = Certificate::new(
            "web",
            CertificateSpec {
                secret_name: "web-tls".to_string(),
                issuer_ref: None,
                common_name: None,
                dns_names: vec![],
            },
        );
        cert.metadata.namespace = Some("default".to_string());
        cert.metadata.uid = uid.map(str::to_string);
        cert
    }

    fn request_with_owner(uid: &str, controller: Option<bool>) -> CertificateRequest {
        let mut req = CertificateRequest::new("web-1", CertificateRequestSpec::default());
        req.metadata.namespace = Some("default".to_string());
        req.metadata.owner_references = Some(vec![OwnerReference {
            api_version: "cert-manager.io/v1".to_string(),
            kind: "Certificate".to_string(),
            name: "web".to_string(),
            uid: uid.to_string(),
            controller,
            block_owner_deletion: Some(true),
        }]);
        req
    }

    #[test]
    fn test_controlled_by_matching_uid() {
        let cert = certificate(Some("uid-1"));
        assert!(is_controlled_by(&request_with_owner("uid-1", Some(true)), &cert));
    }

    #[test]
    fn test_not_controlled_by_other_uid() {
        let cert = certificate(Some("uid-1"));
        assert!(!is_controlled_by(&request_with_owner("uid-2", Some(true)), &cert));
    }

    #[test]
    fn test_non_controller_owner_is_ignored() {
        let cert = certificate(Some("uid-1"));
        assert!(!is_controlled_by(&request_with_owner("uid-1", None), &cert));
        assert!(!is_controlled_by(&request_with_owner("uid-1", Some(false)), &cert));
    }

    #[test]
    fn test_certificate_without_uid_controls_nothing() {
        let cert = certificate(None);
        assert!(!is_controlled_by(&request_with_owner("", Some(true)), &cert));
    }

    #[test]
    fn test_is_complete() {
        let mut req = CertificateRequest::new("web-1", CertificateRequestSpec::default());
        assert!(!req.is_complete());

        req.status = Some(CertificateRequestStatus { certificate: Some(String::new()) });
        assert!(!req.is_complete());

        req.status = Some(CertificateRequestStatus {
            certificate: Some("LS0tLS1CRUdJTi...".to_string()),
        });
        assert!(req.is_complete());
    }
}
