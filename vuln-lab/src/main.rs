//! Vulnerability Lab Binary Entry Point

use clap::Parser;
use lab_core::{init_logging, LoggingConfig};
use vuln_lab::{run_lab, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(&LoggingConfig::default())?;

    let args = Args::parse();

    if let Err(e) = run_lab(args).await {
        tracing::error!("Lab failed: {}", e);
        return Err(e);
    }

    Ok(())
}
