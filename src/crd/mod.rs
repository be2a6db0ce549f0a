//! # Custom Resource Definitions
//!
//! cert-manager resource types consumed by the tool.
//!
//! Only the fields the audit and renewal flow reads are modelled; unknown fields
//! returned by the API server are ignored during deserialization.
//!
//! ## Module Structure
//!
//! - `certificate.rs` - `Certificate` (the certificate declaration)
//! - `certificate_request.rs` - `CertificateRequest` (one issuance attempt) and ownership checks

mod certificate;
mod certificate_request;

// Re-export all public types
pub use certificate::{Certificate, CertificateSpec, IssuerRef};
pub use certificate_request::{
    is_controlled_by, CertificateRequest, CertificateRequestSpec, CertificateRequestStatus,
};
