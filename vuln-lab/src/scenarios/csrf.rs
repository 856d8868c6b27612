//! CSRF via GET link and via auto-submitting POST form
//!
//! Both tables are keyed by host: the victim bank answers for the victim's
//! `host:port`, the lure page for the attacker's.

use super::bank::{BankHandler, CsrfTokens, Defense, TransferParams};
use super::{ScenarioContext, ScenarioTables, LURE_AMOUNT};
use crate::page::StaticPage;
use crate::payloads;
use lab_core::{KeyStrategy, Mode, Result, RouteTable};
use std::sync::Arc;

pub fn build_get(ctx: &ScenarioContext) -> Result<ScenarioTables> {
    let defense = match ctx.mode {
        Mode::Vulnerable => Defense::None,
        Mode::Hardened => Defense::RefererCheck,
    };
    let page = payloads::csrf_get_page(&ctx.victim, &ctx.attacker_account, LURE_AMOUNT);
    build(ctx, "csrf-get", TransferParams::Query, defense, page)
}

pub fn build_post(ctx: &ScenarioContext) -> Result<ScenarioTables> {
    let defense = match ctx.mode {
        Mode::Vulnerable => Defense::None,
        Mode::Hardened => Defense::CsrfToken(Arc::new(CsrfTokens::default())),
    };
    let page = payloads::csrf_post_page(&ctx.victim, &ctx.attacker_account, LURE_AMOUNT);
    build(ctx, "csrf-post", TransferParams::Form, defense, page)
}

fn build(
    ctx: &ScenarioContext,
    name: &str,
    params: TransferParams,
    defense: Defense,
    lure: String,
) -> Result<ScenarioTables> {
    let bank = BankHandler::new(
        ctx.store.clone(),
        ctx.victim.clone(),
        ctx.victim_account.clone(),
        params,
        defense,
    );

    let victim = RouteTable::new(format!("{} victim", name), KeyStrategy::Host)
        .route(ctx.victim.authority(), bank)?;
    let attacker = RouteTable::new(format!("{} attacker", name), KeyStrategy::Host)
        .route(ctx.attacker.authority(), StaticPage::html(lure))?;

    Ok(ScenarioTables { victim, attacker })
}

#[cfg(test)]
mod tests {
    use super::super::tests::{context, send};
    use super::*;
    use axum::http::{header, Method, StatusCode};

    #[tokio::test]
    async fn test_get_csrf_moves_money() {
        let ctx = context(Mode::Vulnerable);
        let tables = build_get(&ctx).unwrap();
        let host = ctx.victim.authority();

        let (status, headers, body) = send(&tables.victim, Method::GET, &host, "/login", &[], "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers.get(header::SET_COOKIE).unwrap(), "session=keliq; httpOnly=true");
        assert!(body.contains("Welcome, keliq"));

        let cookie = [(header::COOKIE, "session=keliq")];
        let (_, _, body) = send(
            &tables.victim,
            Method::GET,
            &host,
            "/transfer?to=hacker&money=100",
            &cookie,
            "",
        )
        .await;
        assert_eq!(body, "keliq transferred 100 to hacker");
        assert_eq!(ctx.store.balance("keliq"), 900);
        assert_eq!(ctx.store.balance("hacker"), 100);

        let (_, _, body) = send(&tables.victim, Method::GET, &host, "/balance", &cookie, "").await;
        assert_eq!(body, "keliq's balance: 900");
    }

    #[tokio::test]
    async fn test_victim_requires_some_session() {
        let ctx = context(Mode::Vulnerable);
        let tables = build_get(&ctx).unwrap();
        let host = ctx.victim.authority();

        let (_, _, body) = send(&tables.victim, Method::GET, &host, "/transfer?to=hacker&money=5", &[], "").await;
        assert_eq!(body, "Please log in first");
        assert_eq!(ctx.store.balance("hacker"), 0);

        // A forged cookie is as good as a login
        let forged = [(header::COOKIE, "session=hacker")];
        send(&tables.victim, Method::GET, &host, "/transfer?to=keliq&money=-500", &forged, "").await;
        assert_eq!(ctx.store.balance("keliq"), 500);
        assert_eq!(ctx.store.balance("hacker"), 500);

        let (status, _, body) = send(&tables.victim, Method::GET, &host, "/nope", &forged, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "404");
    }

    #[tokio::test]
    async fn test_get_csrf_referer_check() {
        let ctx = context(Mode::Hardened);
        let tables = build_get(&ctx).unwrap();
        let host = ctx.victim.authority();
        let cross_site = ctx.attacker.url("/");
        let same_site = ctx.victim.url("/balance");

        for referer in [None, Some(cross_site.as_str()), Some("http://localhost:3000.evil.com/")] {
            let mut headers = vec![(header::COOKIE, "session=keliq")];
            if let Some(referer) = referer {
                headers.push((header::REFERER, referer));
            }
            let (status, _, _) = send(&tables.victim, Method::GET, &host, "/transfer?to=hacker&money=100", &headers, "").await;
            assert_eq!(status, StatusCode::FORBIDDEN);
        }
        assert_eq!(ctx.store.balance("keliq"), 1000);

        let headers = [(header::COOKIE, "session=keliq"), (header::REFERER, same_site.as_str())];
        let (status, _, _) = send(&tables.victim, Method::GET, &host, "/transfer?to=hacker&money=100", &headers, "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ctx.store.balance("hacker"), 100);
    }

    #[tokio::test]
    async fn test_post_csrf_reads_form_body() {
        let ctx = context(Mode::Vulnerable);
        let tables = build_post(&ctx).unwrap();
        let host = ctx.victim.authority();

        let cookie = [(header::COOKIE, "session=keliq")];
        let (_, _, body) = send(&tables.victim, Method::POST, &host, "/transfer", &cookie, "to=hacker&money=100").await;
        assert_eq!(body, "keliq transferred 100 to hacker");
        assert_eq!(ctx.store.balance("hacker"), 100);

        let (_, _, page) = send(&tables.attacker, Method::GET, &ctx.attacker.authority(), "/", &[], "").await;
        assert!(page.contains("form.submit()"));
    }

    #[tokio::test]
    async fn test_post_csrf_token_variant() {
        let ctx = context(Mode::Hardened);
        let tables = build_post(&ctx).unwrap();
        let host = ctx.victim.authority();

        let (_, headers, _) = send(&tables.victim, Method::GET, &host, "/login", &[], "").await;
        assert_eq!(
            headers.get(header::SET_COOKIE).unwrap(),
            "session=keliq; httpOnly=true; SameSite=Strict"
        );

        let cookie = [(header::COOKIE, "session=keliq")];
        let (status, _, _) = send(&tables.victim, Method::POST, &host, "/transfer", &cookie, "to=hacker&money=100").await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (_, _, form) = send(&tables.victim, Method::GET, &host, "/transfer-form", &cookie, "").await;
        let token = form
            .split(r#"name="csrf_token" value=""#)
            .nth(1)
            .and_then(|rest| rest.split('"').next())
            .unwrap()
            .to_string();

        let body = format!("to=hacker&money=100&csrf_token={}", token);
        let (status, _, _) = send(&tables.victim, Method::POST, &host, "/transfer", &cookie, &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ctx.store.balance("hacker"), 100);
    }

    #[tokio::test]
    async fn test_tokens_only_for_open_accounts() {
        let ctx = context(Mode::Hardened);
        let tables = build_post(&ctx).unwrap();
        let host = ctx.victim.authority();

        for i in 0..5 {
            let cookie = format!("session=forged-{}", i);
            let (status, _, body) = send(
                &tables.victim,
                Method::GET,
                &host,
                "/transfer-form",
                &[(header::COOKIE, cookie.as_str())],
                "",
            )
            .await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body, "Unknown account");
        }

        let (status, _, _) = send(
            &tables.victim,
            Method::GET,
            &host,
            "/transfer-form",
            &[(header::COOKIE, "session=hacker")],
            "",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[test]
    fn test_tables_are_keyed_by_origin() {
        let ctx = context(Mode::Vulnerable);
        for tables in [build_get(&ctx).unwrap(), build_post(&ctx).unwrap()] {
            assert!(tables.victim.contains(&ctx.victim.authority()));
            assert!(!tables.victim.contains(&ctx.attacker.authority()));
            assert!(tables.attacker.contains(&ctx.attacker.authority()));
            assert_eq!(tables.victim.len(), 1);
        }
    }
}
