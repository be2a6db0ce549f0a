//! # Certificate Decoding
//!
//! Extracts the identity of the leaf certificate stored in a Secret.

use thiserror::Error;
use x509_parser::error::X509Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid PEM data: {0}")]
    Pem(#[from] pem::PemError),
    #[error("invalid X.509 certificate: {0}")]
    X509(#[from] x509_parser::nom::Err<X509Error>),
}

/// Identity of a decoded certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCertificate {
    /// Serial number rendered in decimal
    pub serial_number: String,
    /// Issuer distinguished name
    pub issuer: String,
}

/// Decode the first PEM block in `bytes` as an X.509 certificate
///
/// Pure: the same bytes always yield the same serial number.
pub fn decode_certificate(bytes: &[u8]) -> Result<DecodedCertificate, DecodeError> {
    let pem = pem::parse(bytes)?;
    let (_, cert) = x509_parser::parse_x509_certificate(pem.contents())?;

    Ok(DecodedCertificate {
        serial_number: cert.tbs_certificate.serial.to_string(),
        issuer: cert.issuer().to_string(),
    })
}
