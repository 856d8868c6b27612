//! Reflected XSS through a movie search page

use super::{ScenarioContext, ScenarioTables};
use crate::collector::attacker_routes;
use crate::escape::encode_html;
use crate::page::{profile_cookies, render_page};
use async_trait::async_trait;
use axum::response::Response;
use lab_core::response::{html, with_cookies};
use lab_core::{Handler, KeyStrategy, Mode, RequestContext, Result, RouteTable};

struct MovieSearch {
    mode: Mode,
    account: String,
}

#[async_trait]
impl Handler for MovieSearch {
    async fn call(&self, ctx: RequestContext) -> Result<Response> {
        let fragment = match ctx.query_param("q").filter(|q| !q.is_empty()) {
            Some(q) => {
                let shown = match self.mode {
                    Mode::Vulnerable => q.to_string(),
                    Mode::Hardened => encode_html(q),
                };
                let results = vec!["x"; 30].join(",");
                format!("<h3>Search results for \"{}\":</h3>{}", shown, results)
            }
            None => "Please enter a movie to search for".to_string(),
        };

        Ok(with_cookies(
            html(render_page(&fragment)),
            &profile_cookies(&self.account),
        ))
    }
}

pub fn build(ctx: &ScenarioContext) -> Result<ScenarioTables> {
    let victim = RouteTable::new("reflected-xss victim", KeyStrategy::MethodPath).route(
        "GET /movies",
        MovieSearch {
            mode: ctx.mode,
            account: ctx.victim_account.clone(),
        },
    )?;
    let attacker = attacker_routes("reflected-xss attacker", ctx.collector.clone())?;
    Ok(ScenarioTables { victim, attacker })
}
