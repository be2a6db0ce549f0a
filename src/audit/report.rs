//! # Reporting
//!
//! Operator-facing summaries. Presentation only; nothing here holds state.

use super::classify::{AffectedSet, SkipCounts};
use crate::config::AuditConfig;
use crate::renewal::RenewalOutcome;
use kube::ResourceExt;
use tracing::{info, warn};

/// Startup notices, printed before any cluster access
pub fn announce(config: &AuditConfig) {
    if let Some(issuer) = config.issuer_filter() {
        warn!("!!!!! --issuer-name has been set. Only certificates issued by '{issuer}' will be considered !!!!!");
    }
    if config.renew {
        warn!("!!!!! --renew has been set. Any affected certificates will have a renewal automatically triggered if found !!!!!");
        warn!(
            "!!!!! Waiting {:?} before proceeding, if you DO NOT want renewals to be triggered, hit ctrl+c NOW !!!!!",
            config.warning_delay
        );
    }
    info!(
        "This tool will query a Kubernetes cluster, check if any certificates are issued with cert-manager \
         and trigger a renewal of any affected certificates. \
         It is not safe to run multiple times, it will trigger a renewal every time."
    );
}

/// Counts after classification
pub fn summary(skipped: &SkipCounts, affected: &AffectedSet) {
    info!("Finished analyzing certificates, results:");
    info!("  Skipped/unable to check: {}", skipped);
    info!("  Affected certificates: {}", affected.len());
}

pub fn dry_run() {
    info!("Will NOT trigger a renewal as --renew is not set");
}

/// Pre-renewal listing of everything about to be mutated
pub fn renewal_plan(affected: &AffectedSet, config: &AuditConfig) {
    info!("Will now attempt to renew the following certificates:");
    for (serial, certificate) in affected {
        info!(
            "  * {}/{} (serial number: {})",
            certificate.namespace().unwrap_or_default(),
            certificate.name_any(),
            serial
        );
    }
    warn!(
        "!!!!! Will now attempt to renew {} certificates, waiting {:?}... !!!!!",
        affected.len(),
        config.confirm_delay
    );
}

/// Final tally once every renewal has finished
pub fn renewal_summary(outcomes: &[RenewalOutcome]) {
    let triggered = outcomes
        .iter()
        .filter(|o| matches!(o, RenewalOutcome::Triggered { .. }))
        .count();
    info!(
        "Renewal complete: {} triggered, {} already in progress",
        triggered,
        outcomes.len() - triggered
    );
}
