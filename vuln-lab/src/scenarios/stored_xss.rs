//! Stored XSS through article comments

use super::{ScenarioContext, ScenarioTables};
use crate::collector::attacker_routes;
use crate::escape::encode_html;
use crate::page::{article_page, profile_cookies};
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::Response;
use lab_core::response::{html, redirect, with_cookies};
use lab_core::{Handler, KeyStrategy, Mode, RequestContext, Result, RouteTable, StateStore};
use std::sync::Arc;

struct ArticleView {
    store: Arc<StateStore>,
    account: String,
}

#[async_trait]
impl Handler for ArticleView {
    async fn call(&self, _ctx: RequestContext) -> Result<Response> {
        let page = article_page(&self.store.article());
        Ok(with_cookies(html(page), &profile_cookies(&self.account)))
    }
}

struct PostComment {
    store: Arc<StateStore>,
    mode: Mode,
    article_path: String,
}

#[async_trait]
impl Handler for PostComment {
    async fn call(&self, ctx: RequestContext) -> Result<Response> {
        let form = ctx.read_form().await?;
        let comment = form.get("comment").map(String::as_str).unwrap_or_default();
        let comment = match self.mode {
            Mode::Vulnerable => comment.to_string(),
            Mode::Hardened => encode_html(comment),
        };
        self.store.post_comment(&comment);
        Ok(redirect(StatusCode::MOVED_PERMANENTLY, &self.article_path))
    }
}

pub fn build(ctx: &ScenarioContext) -> Result<ScenarioTables> {
    let article_path = article_path(ctx);
    let victim = RouteTable::new("stored-xss victim", KeyStrategy::MethodPath)
        .route(
            format!("GET {}", article_path),
            ArticleView {
                store: ctx.store.clone(),
                account: ctx.victim_account.clone(),
            },
        )?
        .route(
            "POST /comments",
            PostComment {
                store: ctx.store.clone(),
                mode: ctx.mode,
                article_path,
            },
        )?;
    let attacker = attacker_routes("stored-xss attacker", ctx.collector.clone())?;
    Ok(ScenarioTables { victim, attacker })
}

/// `/articles/<id>` for the seeded article
pub fn article_path(ctx: &ScenarioContext) -> String {
    format!("/articles/{}", ctx.store.article().id)
}
