//! # force-renew
//!
//! Audits cert-manager Certificates in the current cluster and, with `--renew`,
//! forces re-issuance of every affected certificate.

use anyhow::{Context, Result};
use clap::Parser;
use force_renew::cli::Args;
use force_renew::renewal::TokioSleeper;
use force_renew::store::{build_client, KubeStore};
use force_renew::{logging, run_audit, AuditConfig};
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    // Must run before any TLS connection is opened
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        eprintln!("rustls crypto provider already installed, continuing");
    }

    let args = Args::parse();
    let mut config = AuditConfig::from_env();
    args.apply(&mut config);
    logging::init(config.log_format);

    match run(&args, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &AuditConfig) -> Result<()> {
    let client = build_client(args.context.as_deref(), args.kubeconfig.as_deref()).await?;
    let store = KubeStore::new(client);

    run_audit(&store, &TokioSleeper, config)
        .await
        .context("Certificate audit failed")?;
    Ok(())
}
