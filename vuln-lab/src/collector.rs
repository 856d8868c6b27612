//! Attacker-side collection endpoints
//!
//! Stolen cookies arrive as query parameters on `/cookies`. They are kept in
//! attacker-owned memory; the victim's state store is never involved.

use crate::page::StaticPage;
use crate::payloads::DEFACEMENT_SCRIPT;
use async_trait::async_trait;
use axum::response::Response;
use lab_core::response::empty;
use lab_core::{Handler, KeyStrategy, RequestContext, Result, RouteTable};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// Most recent exfiltrations kept; older ones are evicted
pub const MAX_LOOT: usize = 100;

#[derive(Debug, Default)]
pub struct CookieCollector {
    loot: Mutex<VecDeque<HashMap<String, String>>>,
}

impl CookieCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<HashMap<String, String>>> {
        self.loot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record(&self, query: HashMap<String, String>) {
        warn!(?query, "Collected exfiltrated data");
        let mut loot = self.lock();
        loot.push_back(query);
        while loot.len() > MAX_LOOT {
            loot.pop_front();
        }
    }

    /// The retained loot, oldest first
    pub fn loot(&self) -> Vec<HashMap<String, String>> {
        self.lock().iter().cloned().collect()
    }
}

struct CollectEndpoint {
    collector: Arc<CookieCollector>,
}

#[async_trait]
impl Handler for CollectEndpoint {
    async fn call(&self, ctx: RequestContext) -> Result<Response> {
        self.collector.record(ctx.query().clone());
        Ok(empty())
    }
}

/// Attacker table for the XSS scenarios: `GET /cookies` and `GET /malicious.js`
pub fn attacker_routes(name: &str, collector: Arc<CookieCollector>) -> Result<RouteTable> {
    RouteTable::new(name, KeyStrategy::MethodPath)
        .route("GET /cookies", CollectEndpoint { collector })?
        .route("GET /malicious.js", StaticPage::script(DEFACEMENT_SCRIPT))
}
