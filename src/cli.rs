//! # Command Line
//!
//! Flags for the `force-renew` binary.
//!
//! ## Usage
//!
//! ```bash
//! # Audit only: report affected certificates, change nothing
//! force-renew
//!
//! # Only consider certificates from one issuer
//! force-renew --issuer-name letsencrypt-prod
//!
//! # Trigger re-issuance of every affected certificate
//! force-renew --issuer-name letsencrypt-prod --renew
//!
//! # Target a specific cluster
//! force-renew --kubeconfig ~/.kube/prod --context prod-eu
//! ```

use crate::config::{AuditConfig, LogFormat};
use clap::Parser;
use std::path::PathBuf;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("BUILD_GIT_HASH"),
    ", built ",
    env!("BUILD_DATETIME"),
    ")"
);

/// Audit cert-manager Certificates and force re-issuance of affected ones
#[derive(Debug, Parser)]
#[command(name = "force-renew")]
#[command(
    version = VERSION,
    about = "Audit cert-manager Certificates and force re-issuance of affected ones",
    long_about = None,
    after_help = "\
Without --renew the cluster is only read, never modified.
With --renew there is a fixed 5 second window to abort (ctrl+c) before anything runs.

Environment:
  FORCE_RENEW_POLL_INTERVAL_SECS   interval between CertificateRequest checks (default 1)
  FORCE_RENEW_POLL_TIMEOUT_SECS    ceiling for waiting on a CertificateRequest (default 60)
  FORCE_RENEW_CONFIRM_DELAY_SECS   delay after listing affected certificates (default 2)
  LOG_FORMAT                       text or json (default text)
  RUST_LOG                         tracing filter (default force_renew=info)
"
)]
pub struct Args {
    /// Only consider certificates whose Secret carries this issuer-name annotation.
    /// An empty value disables filtering.
    #[arg(long = "issuer-name", visible_alias = "issuerName", value_name = "NAME")]
    pub issuer_name: Option<String>,

    /// Trigger a renewal of every affected certificate.
    /// It is not safe to run with this flag multiple times; each run triggers a renewal.
    #[arg(long)]
    pub renew: bool,

    /// Kubernetes context to use
    #[arg(long, value_name = "CONTEXT")]
    pub context: Option<String>,

    /// Path to a kubeconfig file (defaults to in-cluster config or ~/.kube/config)
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Log output format (overrides LOG_FORMAT)
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,
}

impl Args {
    /// Overlay command-line flags on top of `config`
    pub fn apply(&self, config: &mut AuditConfig) {
        config.issuer_name.clone_from(&self.issuer_name);
        config.renew = self.renew;
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
    }
}
