//! Scenario wiring
//!
//! Each scenario turns a [`ScenarioContext`] into a victim and an attacker
//! route table. Victim handlers get the shared state store; attacker handlers
//! only ever get attacker-owned state.

pub mod bank;
pub mod csrf;
pub mod reflected_xss;
pub mod stored_xss;

use crate::collector::CookieCollector;
use crate::payloads;
use clap::ValueEnum;
use lab_core::{Mode, Origin, Result, RouteTable, StateStore};
use std::fmt;
use std::sync::Arc;

/// Amount the exploit pages try to move
pub const LURE_AMOUNT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    /// Transfer triggered by a cross-site GET link
    CsrfGet,
    /// Transfer triggered by an auto-submitting cross-site form
    CsrfPost,
    /// Search term echoed back into the page
    ReflectedXss,
    /// Comment persisted and served to every visitor
    StoredXss,
}

impl Scenario {
    pub fn build(self, ctx: &ScenarioContext) -> Result<ScenarioTables> {
        match self {
            Scenario::CsrfGet => csrf::build_get(ctx),
            Scenario::CsrfPost => csrf::build_post(ctx),
            Scenario::ReflectedXss => reflected_xss::build(ctx),
            Scenario::StoredXss => stored_xss::build(ctx),
        }
    }

    /// Steps to reproduce the attack in a browser
    pub fn walkthrough(self, ctx: &ScenarioContext) -> Vec<String> {
        match self {
            Scenario::CsrfGet => vec![
                format!("Log in as the victim: {}", ctx.victim.url("/login")),
                format!("Check the balance: {}", ctx.victim.url("/balance")),
                format!("Visit the attacker and click the link: {}", ctx.attacker.url("/")),
                format!("Check the balance again: {}", ctx.victim.url("/balance")),
            ],
            Scenario::CsrfPost => vec![
                format!("Log in as the victim: {}", ctx.victim.url("/login")),
                format!("Check the balance: {}", ctx.victim.url("/balance")),
                format!(
                    "Visit the attacker (Firefox or Safari; Chrome defaults to SameSite=Lax): {}",
                    ctx.attacker.url("/")
                ),
                format!("Check the balance again: {}", ctx.victim.url("/balance")),
            ],
            Scenario::ReflectedXss => vec![
                format!("Search normally: {}", ctx.victim.url("/movies?q=Kung+Fu+Panda")),
                format!(
                    "Open the crafted link: {}",
                    payloads::reflected_probe_url(&ctx.victim, &ctx.attacker)
                ),
                format!("Stolen cookies show up at {}", ctx.attacker.url("/cookies")),
            ],
            Scenario::StoredXss => vec![
                format!("Open the article: {}", ctx.victim.url(&stored_xss::article_path(ctx))),
                format!("Post this comment: {}", payloads::stored_comment(&ctx.attacker)),
                format!(
                    "Or deface the page with: {}",
                    payloads::external_script_tag(&ctx.attacker)
                ),
                "Reload the article; every visitor now runs the script".to_string(),
            ],
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Scenario::CsrfGet => "csrf-get",
            Scenario::CsrfPost => "csrf-post",
            Scenario::ReflectedXss => "reflected-xss",
            Scenario::StoredXss => "stored-xss",
        };
        f.write_str(name)
    }
}

/// Everything a scenario needs to build its tables
#[derive(Debug, Clone)]
pub struct ScenarioContext {
    pub store: Arc<StateStore>,
    pub collector: Arc<CookieCollector>,
    pub victim: Origin,
    pub attacker: Origin,
    pub mode: Mode,
    pub victim_account: String,
    pub attacker_account: String,
}

#[derive(Debug)]
pub struct ScenarioTables {
    pub victim: RouteTable,
    pub attacker: RouteTable,
}
