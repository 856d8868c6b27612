//! The victim bank used by both CSRF scenarios
//!
//! One handler per origin, switching on path, keyed by host. The session
//! cookie alone identifies the caller. Defences are alternate variants of the
//! same handler so the exploit can be replayed against each.

use async_trait::async_trait;
use axum::http::{header, StatusCode};
use axum::response::Response;
use lab_common::{SameSite, SessionToken};
use lab_core::response::{html, with_cookies, with_status};
use lab_core::{Handler, Origin, RequestContext, Result, StateStore};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;
use uuid::Uuid;

/// Where `/transfer` takes `to` and `money` from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferParams {
    Query,
    Form,
}

/// Protection applied to `/transfer`
#[derive(Debug, Clone)]
pub enum Defense {
    None,
    /// Only accept requests whose `Referer` is on the victim origin
    RefererCheck,
    /// Require the per-account token rendered by `/transfer-form`
    CsrfToken(Arc<CsrfTokens>),
}

/// Most accounts holding a live anti-forgery token at once
pub const MAX_CSRF_TOKENS: usize = 64;

/// Per-account anti-forgery tokens for the hardened POST variant. The oldest
/// token is evicted once [`MAX_CSRF_TOKENS`] accounts hold one.
#[derive(Debug, Default)]
pub struct CsrfTokens {
    tokens: Mutex<VecDeque<(String, String)>>,
}

impl CsrfTokens {
    fn lock(&self) -> MutexGuard<'_, VecDeque<(String, String)>> {
        self.tokens.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Token for `account`, minted on first use
    pub fn token_for(&self, account: &str) -> String {
        let mut tokens = self.lock();
        if let Some((_, token)) = tokens.iter().find(|(owner, _)| owner == account) {
            return token.clone();
        }

        let token = Uuid::new_v4().to_string();
        tokens.push_back((account.to_string(), token.clone()));
        while tokens.len() > MAX_CSRF_TOKENS {
            tokens.pop_front();
        }
        token
    }

    pub fn verify(&self, account: &str, presented: Option<&str>) -> bool {
        match presented {
            Some(presented) => self
                .lock()
                .iter()
                .any(|(owner, token)| owner == account && token == presented),
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

pub struct BankHandler {
    store: Arc<StateStore>,
    victim: Origin,
    account: String,
    params: TransferParams,
    defense: Defense,
}

impl BankHandler {
    pub fn new(
        store: Arc<StateStore>,
        victim: Origin,
        account: impl Into<String>,
        params: TransferParams,
        defense: Defense,
    ) -> Self {
        Self {
            store,
            victim,
            account: account.into(),
            params,
            defense,
        }
    }

    fn login(&self) -> Response {
        let session = self.store.login(&self.account);
        let mut cookie = session.to_cookie().attribute("httpOnly=true");
        if matches!(self.defense, Defense::CsrfToken(_)) {
            cookie = cookie.same_site(SameSite::Strict);
        }
        with_cookies(html(format!("<h2>Welcome, {}!</h2>", session)), &[cookie])
    }

    fn balance(&self, session: &SessionToken) -> Response {
        html(format!(
            "{}'s balance: {}",
            session,
            self.store.balance(session.account())
        ))
    }

    async fn transfer(&self, session: &SessionToken, ctx: &RequestContext) -> Result<Response> {
        let params = match self.params {
            TransferParams::Query => ctx.query().clone(),
            TransferParams::Form => ctx.read_form().await?,
        };

        if let Some(rejection) = self.check_defense(session, ctx, &params) {
            return Ok(rejection);
        }

        let to = params.get("to").map(String::as_str).unwrap_or_default();
        let amount = parse_amount(params.get("money").map(String::as_str));
        let receipt = self.store.transfer(session, to, amount);
        Ok(html(receipt.to_string()))
    }

    fn check_defense(
        &self,
        session: &SessionToken,
        ctx: &RequestContext,
        params: &HashMap<String, String>,
    ) -> Option<Response> {
        let allowed = match &self.defense {
            Defense::None => true,
            Defense::RefererCheck => {
                let referer = ctx.header(header::REFERER).unwrap_or_default();
                referer == self.victim.base_url()
                    || referer.starts_with(&format!("{}/", self.victim.base_url()))
            }
            Defense::CsrfToken(tokens) => tokens.verify(
                session.account(),
                params.get("csrf_token").map(String::as_str),
            ),
        };

        if allowed {
            return None;
        }
        warn!(account = session.account(), "Rejected cross-site transfer");
        Some(with_status(StatusCode::FORBIDDEN, "Cross-site transfer rejected"))
    }

    fn transfer_form(&self, session: &SessionToken, tokens: &CsrfTokens) -> Response {
        // Forged sessions for accounts the bank never opened get no token
        if !self.store.has_account(session.account()) {
            return with_status(StatusCode::FORBIDDEN, "Unknown account");
        }
        html(format!(
            r#"
<form method="POST" action="/transfer">
  <input type="hidden" name="csrf_token" value="{token}" />
  <input type="text" name="to" />
  <input type="number" name="money" />
  <button type="submit">Transfer</button>
</form>"#,
            token = tokens.token_for(session.account())
        ))
    }
}

#[async_trait]
impl Handler for BankHandler {
    async fn call(&self, ctx: RequestContext) -> Result<Response> {
        if ctx.path() == "/login" {
            return Ok(self.login());
        }

        let Some(session) = SessionToken::from_cookies(ctx.cookies()) else {
            return Ok(html("Please log in first"));
        };

        match (ctx.path(), &self.defense) {
            ("/balance", _) => Ok(self.balance(&session)),
            ("/transfer", _) => self.transfer(&session, &ctx).await,
            ("/transfer-form", Defense::CsrfToken(tokens)) => {
                Ok(self.transfer_form(&session, tokens))
            }
            // Unknown paths on a known host answer 200 with a bare "404"
            _ => Ok(html("404")),
        }
    }
}

/// Money as an integer; anything unparsable counts as 0
pub fn parse_amount(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0)
}
