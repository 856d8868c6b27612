//! Configuration types and utilities

use crate::error::LabError;
use crate::store::Article;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Default cap on a buffered request body
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Whether scenario handlers run as shipped or with their documented defence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// The exploitable baseline
    #[default]
    Vulnerable,
    /// The defence variant, for comparison
    Hardened,
}

/// Host name and port that identify one simulated website
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginConfig {
    /// Host name browsers use for this origin; host-keyed route tables match on it
    pub host: String,
    /// Port to listen on, 0 picks a free one
    pub port: u16,
}

/// Values the state store is seeded with on every start
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub accounts: BTreeMap<String, i64>,
    /// Account the victim logs in as
    pub victim_account: String,
    /// Account the exploit pages send money to
    pub attacker_account: String,
    pub article: Article,
}

impl Default for SeedConfig {
    fn default() -> Self {
        let mut accounts = BTreeMap::new();
        accounts.insert("keliq".to_string(), 1000);
        accounts.insert("hacker".to_string(), 0);

        Self {
            accounts,
            victim_account: "keliq".to_string(),
            attacker_account: "hacker".to_string(),
            article: Article::default(),
        }
    }
}

/// Startup configuration for both listeners
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabConfig {
    /// Address both listeners bind to
    pub listen_address: String,
    pub victim: OriginConfig,
    pub attacker: OriginConfig,
    pub seed: SeedConfig,
    pub mode: Mode,
    pub max_body_bytes: usize,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0".to_string(),
            victim: OriginConfig {
                host: "localhost".to_string(),
                port: 3000,
            },
            attacker: OriginConfig {
                host: "127.0.0.1".to_string(),
                port: 4000,
            },
            seed: SeedConfig::default(),
            mode: Mode::default(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl LabConfig {
    /// Reject configurations the listeners could never serve
    pub fn validate(&self) -> Result<(), LabError> {
        self.listen_address.parse::<IpAddr>().map_err(|e| {
            LabError::Configuration(format!(
                "Invalid listen address {}: {}",
                self.listen_address, e
            ))
        })?;

        if self.victim.port != 0 && self.victim.port == self.attacker.port {
            return Err(LabError::Configuration(format!(
                "Victim and attacker cannot share port {}",
                self.victim.port
            )));
        }

        if self.victim.host.is_empty() || self.attacker.host.is_empty() {
            return Err(LabError::Configuration(
                "Origin host names must not be empty".to_string(),
            ));
        }

        if !self.seed.accounts.contains_key(&self.seed.victim_account) {
            return Err(LabError::Configuration(format!(
                "Victim account {} is not seeded",
                self.seed.victim_account
            )));
        }

        if self.max_body_bytes == 0 {
            return Err(LabError::Configuration(
                "max_body_bytes must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
