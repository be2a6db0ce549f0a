//! # Classifier
//!
//! Turns correlation outcomes into the set of certificates to renew.

use super::correlate::{Correlation, SkipReason};
use crate::crd::Certificate;
use kube::ResourceExt;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Affected certificates keyed by decimal serial number
///
/// Iteration order is unspecified.
pub type AffectedSet = HashMap<String, Certificate>;

/// Tally of certificates left out of the affected set, by reason
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub not_found: usize,
    pub no_data: usize,
    pub decode_error: usize,
    pub filtered: usize,
}

impl SkipCounts {
    fn record(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::NotFound { .. } => self.not_found += 1,
            SkipReason::NoData { .. } => self.no_data += 1,
            SkipReason::Decode { .. } => self.decode_error += 1,
            SkipReason::Filtered { .. } => self.filtered += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.not_found + self.no_data + self.decode_error + self.filtered
    }
}

impl fmt::Display for SkipCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (not found: {}, no data: {}, decode error: {}, filtered: {})",
            self.total(),
            self.not_found,
            self.no_data,
            self.decode_error,
            self.filtered
        )
    }
}

#[derive(Debug, Default)]
pub struct Classification {
    pub affected: AffectedSet,
    pub skipped: SkipCounts,
}

/// Build the affected set
///
/// A blank or absent `issuer_filter` accepts every decoded certificate. Otherwise
/// only certificates whose issuer-name annotation equals the filter exactly are
/// kept. On serial collision the later certificate replaces the earlier one.
#[must_use]
pub fn classify(correlations: Vec<Correlation>, issuer_filter: Option<&str>) -> Classification {
    let filter = issuer_filter.filter(|f| !f.is_empty());
    let mut classification = Classification::default();

    for Correlation {
        certificate,
        outcome,
    } in correlations
    {
        let correlated = match outcome {
            Ok(correlated) => correlated,
            Err(reason) => {
                classification.skipped.record(&reason);
                continue;
            }
        };

        if let Some(filter) = filter {
            if correlated.issuer_name.as_deref() != Some(filter) {
                let reason = SkipReason::Filtered {
                    issuer: correlated.issuer_name,
                    filter: filter.to_string(),
                };
                debug!(
                    "Certificate {}/{}: {reason}, skipping...",
                    certificate.namespace().unwrap_or_default(),
                    certificate.name_any()
                );
                classification.skipped.record(&reason);
                continue;
            }
        }

        classification
            .affected
            .insert(correlated.serial_number, certificate);
    }

    classification
}
