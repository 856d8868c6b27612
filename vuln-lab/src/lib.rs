//! Vulnerability Lab
//!
//! Runs one of the CSRF/XSS scenarios on a victim origin and an attacker
//! origin, using the harness from `lab-core`.

pub mod collector;
pub mod escape;
pub mod page;
pub mod payloads;
pub mod scenarios;

use clap::Parser;
use collector::CookieCollector;
use lab_core::{DualOriginServer, LabConfig, LabHandle, Mode, OriginConfig, StateStore};
use scenarios::{Scenario, ScenarioContext};
use std::sync::Arc;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Scenario to run
    #[arg(long, value_enum, default_value_t = Scenario::CsrfGet)]
    pub scenario: Scenario,

    /// `vulnerable`, or `hardened` to enable the scenario's defence
    #[arg(long, default_value = "vulnerable", value_parser = parse_mode)]
    pub mode: Mode,

    /// Address both listeners bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub listen_addr: String,

    /// Host name of the victim origin
    #[arg(long, default_value = "localhost")]
    pub victim_host: String,

    /// Port of the victim origin
    #[arg(long, default_value_t = 3000)]
    pub victim_port: u16,

    /// Host name of the attacker origin
    #[arg(long, default_value = "127.0.0.1")]
    pub attacker_host: String,

    /// Port of the attacker origin
    #[arg(long, default_value_t = 4000)]
    pub attacker_port: u16,
}

impl Args {
    pub fn to_config(&self) -> LabConfig {
        LabConfig {
            listen_address: self.listen_addr.clone(),
            victim: OriginConfig {
                host: self.victim_host.clone(),
                port: self.victim_port,
            },
            attacker: OriginConfig {
                host: self.attacker_host.clone(),
                port: self.attacker_port,
            },
            mode: self.mode,
            ..Default::default()
        }
    }
}

fn parse_mode(raw: &str) -> Result<Mode, String> {
    match raw.to_ascii_lowercase().as_str() {
        "vulnerable" => Ok(Mode::Vulnerable),
        "hardened" => Ok(Mode::Hardened),
        other => Err(format!("unknown mode '{}', expected vulnerable or hardened", other)),
    }
}

/// A scenario with both listeners up
pub struct RunningLab {
    pub handle: LabHandle,
    pub store: Arc<StateStore>,
    pub collector: Arc<CookieCollector>,
    pub walkthrough: Vec<String>,
}

/// Bind both origins, seed fresh state and start serving `scenario`
pub async fn launch(config: &LabConfig, scenario: Scenario) -> lab_core::Result<RunningLab> {
    config.validate()?;

    let bound = DualOriginServer::bind(config).await?;
    let ctx = ScenarioContext {
        store: Arc::new(StateStore::seeded(&config.seed)),
        collector: Arc::new(CookieCollector::new()),
        victim: bound.victim_origin().clone(),
        attacker: bound.attacker_origin().clone(),
        mode: config.mode,
        victim_account: config.seed.victim_account.clone(),
        attacker_account: config.seed.attacker_account.clone(),
    };

    let tables = scenario.build(&ctx)?;
    let walkthrough = scenario.walkthrough(&ctx);
    let handle = bound.serve(tables.victim, tables.attacker);
    tracing::info!(mode = ?config.mode, "Scenario {} running", scenario);

    Ok(RunningLab {
        handle,
        store: ctx.store,
        collector: ctx.collector,
        walkthrough,
    })
}

pub async fn run_lab(args: Args) -> anyhow::Result<()> {
    let config = args.to_config();
    let mut lab = launch(&config, args.scenario).await?;

    println!("🎯 Scenario: {} ({:?})", args.scenario, config.mode);
    println!("   Victim:   {}", lab.handle.victim());
    println!("   Attacker: {}", lab.handle.attacker());
    for (account, balance) in lab.store.ledger.accounts() {
        println!("   Account {}: {}", account, balance);
    }
    println!();
    for (i, step) in lab.walkthrough.iter().enumerate() {
        println!("   {}. {}", i + 1, step);
    }
    println!();

    tokio::select! {
        result = lab.handle.wait() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received, stopping lab...");
            lab.handle.shutdown();
            lab.handle.wait().await?;
        }
    }
    Ok(())
}
