//! Shared fixtures for the cross-crate tests

use lab_core::{LabConfig, Mode, OriginConfig};
use std::time::Duration;
use vuln_lab::scenarios::Scenario;
use vuln_lab::{launch, RunningLab};

/// Both origins on loopback with OS-assigned ports
pub fn ephemeral_config(mode: Mode) -> LabConfig {
    LabConfig {
        listen_address: "127.0.0.1".to_string(),
        victim: OriginConfig {
            host: "localhost".to_string(),
            port: 0,
        },
        attacker: OriginConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        mode,
        ..Default::default()
    }
}

/// Launch `scenario` on fresh state and give the listeners a moment
pub async fn start(scenario: Scenario, mode: Mode) -> anyhow::Result<RunningLab> {
    let _ = tracing_subscriber::fmt::try_init();
    let lab = launch(&ephemeral_config(mode), scenario).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(lab)
}
