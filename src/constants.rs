//! # Constants
//!
//! Shared constants used throughout the tool.
//!
//! Durations are the defaults of the renewal procedure. All but the warning
//! delay can be overridden via environment variables (see
//! [`crate::config::AuditConfig::from_env`]).

/// Secret data key holding the PEM-encoded leaf certificate
pub const TLS_CERT_KEY: &str = "tls.crt";

/// Secret annotation cert-manager uses to record which issuer produced the certificate.
/// Used both for `--issuer-name` filtering and as the forced-renewal trigger.
pub const ISSUER_NAME_ANNOTATION: &str = "cert-manager.io/issuer-name";

/// Value written to [`ISSUER_NAME_ANNOTATION`] to make cert-manager believe the
/// issuerRef changed, which triggers a one-time re-issuance
pub const FORCE_RENEWAL_SENTINEL: &str = "force-renewal-triggered";

/// Default interval between checks for a new CertificateRequest (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;

/// Default ceiling for waiting on a new CertificateRequest (seconds)
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 60;

/// Interrupt window shown when `--renew` is set (seconds); not configurable
pub const DEFAULT_WARNING_DELAY_SECS: u64 = 5;

/// Default delay between listing affected certificates and the first mutation (seconds)
pub const DEFAULT_CONFIRM_DELAY_SECS: u64 = 2;

/// Default tracing filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "force_renew=info";
