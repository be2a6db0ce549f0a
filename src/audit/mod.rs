//! # Audit Pipeline
//!
//! Fetch → correlate → classify → report, then drive renewals when authorized.
//!
//! - `fetch.rs` - bulk reads of Certificates and Secrets
//! - `correlate.rs` - Certificate ↔ Secret pairing and certificate decoding
//! - `classify.rs` - issuer filtering and the affected set
//! - `report.rs` - operator-facing output

pub mod classify;
pub mod correlate;
pub mod fetch;
pub mod report;

pub use classify::{classify, AffectedSet, Classification, SkipCounts};
pub use correlate::{correlate, CorrelatedSecret, Correlation, SecretIndex, SkipReason};
pub use fetch::{fetch_inventory, FetchError, Inventory};

use crate::config::AuditConfig;
use crate::renewal::{RenewalDriver, RenewalError, RenewalOutcome, Sleeper};
use crate::store::CertificateStore;
use kube::ResourceExt;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("failed to renew Certificate {namespace}/{name}: {source}")]
    Renewal {
        namespace: String,
        name: String,
        #[source]
        source: RenewalError,
    },
}

/// What a completed run found and did
#[derive(Debug, Default)]
pub struct AuditReport {
    pub certificates_checked: usize,
    pub skipped: SkipCounts,
    pub affected: AffectedSet,
    /// One entry per affected certificate when renewing; empty on a dry run
    pub renewals: Vec<RenewalOutcome>,
}

/// Run a full audit and, if `config.renew` is set, renew every affected certificate
///
/// Renewals run sequentially. The first renewal failure aborts the run and
/// leaves the remaining certificates untouched.
pub async fn run_audit(
    store: &dyn CertificateStore,
    sleeper: &dyn Sleeper,
    config: &AuditConfig,
) -> Result<AuditReport, AuditError> {
    report::announce(config);
    if config.renew {
        sleeper.sleep(config.warning_delay).await;
    }

    let inventory = fetch_inventory(store).await?;
    let correlations = correlate(&inventory.certificates, &inventory.secrets);
    let Classification { affected, skipped } = classify(correlations, config.issuer_filter());

    report::summary(&skipped, &affected);

    let mut audit = AuditReport {
        certificates_checked: inventory.certificates.len(),
        skipped,
        affected,
        renewals: Vec::new(),
    };

    if audit.affected.is_empty() {
        return Ok(audit);
    }
    if !config.renew {
        report::dry_run();
        return Ok(audit);
    }

    report::renewal_plan(&audit.affected, config);
    sleeper.sleep(config.confirm_delay).await;

    let driver = RenewalDriver::new(store, sleeper, config.poll_settings());
    for certificate in audit.affected.values() {
        let namespace = certificate.namespace().unwrap_or_default();
        let name = certificate.name_any();
        info!(namespace = %namespace, name = %name, "Triggering renewal of Certificate {}/{}", namespace, name);

        match driver.renew(certificate).await {
            Ok(outcome) => audit.renewals.push(outcome),
            Err(source) => {
                error!("Failed to renew certificate {}/{}: {}", namespace, name, source);
                return Err(AuditError::Renewal {
                    namespace,
                    name,
                    source,
                });
            }
        }
    }

    report::renewal_summary(&audit.renewals);
    Ok(audit)
}
