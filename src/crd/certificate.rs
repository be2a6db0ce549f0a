//! # Certificate
//!
//! The cert-manager certificate declaration.

use serde::{Deserialize, Serialize};

/// cert-manager `Certificate`
///
/// Declares the desired TLS certificate and names the Secret that holds the
/// issued material. Read-only from this tool's perspective.
///
/// # Example
///
/// ```yaml
/// apiVersion: cert-manager.io/v1
/// kind: Certificate
/// metadata:
///   name: web
///   namespace: default
/// spec:
///   secretName: web-tls
///   dnsNames:
///     - example.com
///   issuerRef:
///     name: letsencrypt-prod
///     kind: ClusterIssuer
/// ```
#[derive(kube::CustomResource, Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[kube(
    kind = "Certificate",
    group = "cert-manager.io",
    version = "v1",
    namespaced,
    shortname = "cert"
)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Name of the Secret (in the Certificate's namespace) storing the issued certificate
    pub secret_name: String,
    /// Issuer responsible for this certificate
    #[serde(default)]
    pub issuer_ref: Option<IssuerRef>,
    #[serde(default)]
    pub common_name: Option<String>,
    #[serde(default)]
    pub dns_names: Vec<String>,
}

/// Reference to an Issuer or ClusterIssuer
#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IssuerRef {
    pub name: String,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let json = serde_json::json!({
            "apiVersion": "cert-manager.io/v1",
            "kind": "Certificate",
            "metadata": { "name": "web", "namespace": "default" },
            "spec": {
                "secretName": "web-tls",
                "dnsNames": ["example.com"],
                "issuerRef": { "name": "letsencrypt-prod", "kind": "ClusterIssuer" },
                "privateKey": { "rotationPolicy": "Always" }
            }
        });

        let cert: Certificate = serde_json::from_value(json).unwrap();
        assert_eq!(cert.spec.secret_name, "web-tls");
        assert_eq!(cert.spec.dns_names, vec!["example.com".to_string()]);
        assert_eq!(
            cert.spec.issuer_ref.map(|r| r.name),
            Some("letsencrypt-prod".to_string())
        );
    }
}
