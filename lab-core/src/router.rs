//! Route tables and dispatch
//!
//! A [`RouteTable`] maps an exact dispatch key to a handler. How the key is
//! derived from a request is the table's [`KeyStrategy`]: by `Host` header,
//! modelling per-origin behaviour, or by `"METHOD /path"`, modelling
//! per-endpoint behaviour on one origin.

use crate::error::LabError;
use crate::request::RequestContext;
use crate::response::not_found;
use crate::Result;
use async_trait::async_trait;
use axum::http::Method;
use axum::response::Response;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Anything that can answer a normalized request
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, ctx: RequestContext) -> Result<Response>;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(RequestContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    async fn call(&self, ctx: RequestContext) -> Result<Response> {
        (self)(ctx).await
    }
}

/// How a table turns a request into its dispatch key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyStrategy {
    /// The `Host` header verbatim, e.g. `localhost:3000`
    Host,
    /// `"METHOD /path"`, e.g. `GET /movies`
    MethodPath,
}

impl KeyStrategy {
    pub fn key_for(&self, ctx: &RequestContext) -> String {
        match self {
            KeyStrategy::Host => ctx.host().unwrap_or_default().to_string(),
            KeyStrategy::MethodPath => method_path_key(ctx.method(), ctx.path()),
        }
    }
}

/// Build a `"METHOD /path"` key
pub fn method_path_key(method: &Method, path: &str) -> String {
    format!("{} {}", method, path)
}

pub struct RouteTable {
    name: String,
    strategy: KeyStrategy,
    routes: HashMap<String, Arc<dyn Handler>>,
}

impl RouteTable {
    pub fn new(name: impl Into<String>, strategy: KeyStrategy) -> Self {
        Self {
            name: name.into(),
            strategy,
            routes: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register `handler` under `key`. Keys are unique within a table.
    pub fn register(&mut self, key: impl Into<String>, handler: impl Handler) -> Result<()> {
        let key = key.into();
        if self.routes.contains_key(&key) {
            return Err(LabError::DuplicateRoute { key });
        }
        debug!(table = %self.name, key = %key, "Route registered");
        self.routes.insert(key, Arc::new(handler));
        Ok(())
    }

    /// Builder form of [`register`](Self::register)
    pub fn route(mut self, key: impl Into<String>, handler: impl Handler) -> Result<Self> {
        self.register(key, handler)?;
        Ok(self)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.routes.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.routes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Exact-match lookup. No match is the fixed 404, never an error; a match
    /// gets the request and its response is returned untouched.
    pub async fn dispatch(&self, key: &str, ctx: RequestContext) -> Result<Response> {
        match self.routes.get(key) {
            Some(handler) => handler.call(ctx).await,
            None => {
                debug!(table = %self.name, key, "No route matched");
                Ok(not_found())
            }
        }
    }

    /// Derive the key with this table's strategy, then dispatch
    pub async fn handle(&self, ctx: RequestContext) -> Result<Response> {
        let key = self.strategy.key_for(&ctx);
        self.dispatch(&key, ctx).await
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<_> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("RouteTable")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("keys", &keys)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{html, NOT_FOUND_BODY};
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ctx(method: Method, uri: &str, host: &str) -> RequestContext {
        RequestContext::from_request(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::HOST, host)
                .body(Body::empty())
                .unwrap(),
        )
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    struct Counting {
        hits: Arc<AtomicUsize>,
        label: &'static str,
    }

    #[async_trait]
    impl Handler for Counting {
        async fn call(&self, _ctx: RequestContext) -> Result<Response> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(html(self.label))
        }
    }

    #[test]
    fn test_key_strategies() {
        let c = ctx(Method::POST, "/comments?x=1", "localhost:3000");
        assert_eq!(KeyStrategy::Host.key_for(&c), "localhost:3000");
        assert_eq!(KeyStrategy::MethodPath.key_for(&c), "POST /comments");
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let mut table = RouteTable::new("victim", KeyStrategy::MethodPath);
        table
            .register("GET /", |_ctx: RequestContext| async { Ok::<_, LabError>(html("a")) })
            .unwrap();
        let err = table
            .register("GET /", |_ctx: RequestContext| async { Ok::<_, LabError>(html("b")) })
            .unwrap_err();
        assert!(matches!(err, LabError::DuplicateRoute { .. }));
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn test_unregistered_key_is_not_found() {
        let table = RouteTable::new("empty", KeyStrategy::Host);
        let response = table
            .dispatch("nowhere:1", ctx(Method::GET, "/", "nowhere:1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_text(response).await, NOT_FOUND_BODY);
    }

    #[tokio::test]
    async fn test_registered_handler_runs_exactly_once() {
        let a_hits = Arc::new(AtomicUsize::new(0));
        let b_hits = Arc::new(AtomicUsize::new(0));
        let table = RouteTable::new("victim", KeyStrategy::MethodPath)
            .route("GET /a", Counting { hits: a_hits.clone(), label: "a" })
            .unwrap()
            .route("GET /b", Counting { hits: b_hits.clone(), label: "b" })
            .unwrap();

        let response = table
            .handle(ctx(Method::GET, "/a", "localhost:3000"))
            .await
            .unwrap();
        assert_eq!(body_text(response).await, "a");
        assert_eq!(a_hits.load(Ordering::SeqCst), 1);
        assert_eq!(b_hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_lookup_is_exact() {
        let hits = Arc::new(AtomicUsize::new(0));
        let table = RouteTable::new("victim", KeyStrategy::MethodPath)
            .route("GET /movies", Counting { hits: hits.clone(), label: "m" })
            .unwrap();

        for (method, uri) in [
            (Method::GET, "/movies/"),
            (Method::POST, "/movies"),
            (Method::GET, "/Movies"),
        ] {
            let response = table.handle(ctx(method, uri, "localhost")).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
        // Query strings are not part of the key
        let response = table
            .handle(ctx(Method::GET, "/movies?q=kungfu", "localhost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_handler_errors_pass_through() {
        let table = RouteTable::new("victim", KeyStrategy::Host)
            .route("localhost:3000", |_ctx: RequestContext| async {
                Err::<Response, _>(LabError::Handler("boom".to_string()))
            })
            .unwrap();
        let result = table.handle(ctx(Method::GET, "/", "localhost:3000")).await;
        assert!(matches!(result, Err(LabError::Handler(_))));
    }
}
