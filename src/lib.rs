//! cert-manager Certificate audit and forced renewal
//!
//! The library runs the whole audit against any [`store::CertificateStore`];
//! the `force-renew` binary binds it to a live cluster.

pub mod audit;
pub mod cli;
pub mod config;
pub mod constants;
pub mod crd;
pub mod decode;
pub mod logging;
pub mod renewal;
pub mod store;

pub use audit::{run_audit, AuditError, AuditReport};
pub use config::AuditConfig;
