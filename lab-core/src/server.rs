//! Dual-origin server harness
//!
//! Two independent listeners, one per simulated website, each serving its own
//! route table through the same normalize → key → dispatch pipeline. Binding
//! happens before the tables are built so host-keyed tables can use the ports
//! that were actually assigned.

use crate::config::{LabConfig, OriginConfig};
use crate::error::LabError;
use crate::request::RequestContext;
use crate::router::RouteTable;
use crate::Result;
use axum::{
    extract::{Request, State},
    response::{IntoResponse, Response},
    Router,
};
use std::any::Any;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// A (host, port) pair identifying one simulated website
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Origin {
    pub host: String,
    pub port: u16,
}

impl Origin {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port`, the value browsers send in the `Host` header
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.authority())
    }

    /// Absolute URL for `path_and_query`, which must start with `/`
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url(), path_and_query)
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.base_url())
    }
}

#[derive(Clone)]
struct OriginState {
    label: &'static str,
    table: Arc<RouteTable>,
    body_limit: usize,
}

/// The axum service for one origin. Every request, whatever its method or
/// path, goes through the table's dispatcher.
pub fn origin_router(label: &'static str, table: Arc<RouteTable>, body_limit: usize) -> Router {
    Router::new()
        .fallback(dispatch_request)
        .with_state(OriginState {
            label,
            table,
            body_limit,
        })
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
}

async fn dispatch_request(State(state): State<OriginState>, req: Request) -> Response {
    let ctx = RequestContext::from_request(req).with_body_limit(state.body_limit);
    match state.table.handle(ctx).await {
        Ok(response) => response,
        Err(e) => {
            warn!(origin = state.label, table = state.table.name(), "Request failed: {}", e);
            e.into_response()
        }
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);
    LabError::Handler(detail).into_response()
}

struct BoundOrigin {
    label: &'static str,
    origin: Origin,
    listener: TcpListener,
}

async fn bind_origin(
    label: &'static str,
    listen_address: &str,
    config: &OriginConfig,
) -> Result<BoundOrigin> {
    let ip: IpAddr = listen_address.parse().map_err(|e| {
        LabError::Configuration(format!("Invalid listen address {}: {}", listen_address, e))
    })?;
    let addr = SocketAddr::new(ip, config.port);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| LabError::Bind {
            origin: label.to_string(),
            addr: addr.to_string(),
            source,
        })?;
    let port = listener.local_addr()?.port();
    let origin = Origin::new(config.host.clone(), port);
    info!("{} origin listening on {}:{} as {}", label, ip, port, origin);

    Ok(BoundOrigin {
        label,
        origin,
        listener,
    })
}

pub struct DualOriginServer;

impl DualOriginServer {
    /// Bind the victim and attacker listeners
    pub async fn bind(config: &LabConfig) -> Result<BoundLab> {
        let victim = bind_origin("victim", &config.listen_address, &config.victim).await?;
        let attacker = bind_origin("attacker", &config.listen_address, &config.attacker).await?;
        Ok(BoundLab {
            victim,
            attacker,
            body_limit: config.max_body_bytes,
        })
    }
}

/// Both listeners bound, nothing served yet
pub struct BoundLab {
    victim: BoundOrigin,
    attacker: BoundOrigin,
    body_limit: usize,
}

impl BoundLab {
    pub fn victim_origin(&self) -> &Origin {
        &self.victim.origin
    }

    pub fn attacker_origin(&self) -> &Origin {
        &self.attacker.origin
    }

    /// Start serving. Passing the same `Arc` twice shares one table between
    /// both origins.
    pub fn serve(
        self,
        victim: impl Into<Arc<RouteTable>>,
        attacker: impl Into<Arc<RouteTable>>,
    ) -> LabHandle {
        let victim_origin = self.victim.origin.clone();
        let attacker_origin = self.attacker.origin.clone();

        let mut tasks = JoinSet::new();
        spawn_origin(&mut tasks, self.victim, victim.into(), self.body_limit);
        spawn_origin(&mut tasks, self.attacker, attacker.into(), self.body_limit);

        LabHandle {
            victim: victim_origin,
            attacker: attacker_origin,
            tasks,
        }
    }
}

fn spawn_origin(
    tasks: &mut JoinSet<Result<()>>,
    bound: BoundOrigin,
    table: Arc<RouteTable>,
    body_limit: usize,
) {
    let BoundOrigin {
        label,
        origin,
        listener,
    } = bound;
    let app = origin_router(label, table, body_limit);

    tasks.spawn(async move {
        axum::serve(listener, app).await.map_err(|e| {
            error!("{} origin {} stopped: {}", label, origin, e);
            LabError::Io(e)
        })
    });
}

/// Running listeners
pub struct LabHandle {
    victim: Origin,
    attacker: Origin,
    tasks: JoinSet<Result<()>>,
}

impl LabHandle {
    pub fn victim(&self) -> &Origin {
        &self.victim
    }

    pub fn attacker(&self) -> &Origin {
        &self.attacker
    }

    /// Wait for both listeners to stop. One failing does not stop the other;
    /// the first error seen is returned. Listeners stopped by
    /// [`shutdown`](Self::shutdown) count as a clean exit.
    pub async fn wait(&mut self) -> Result<()> {
        let mut first_error = None;
        while let Some(joined) = self.tasks.join_next().await {
            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) if e.is_cancelled() => Ok(()),
                Err(e) => Err(LabError::Io(std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("listener task failed: {}", e),
                ))),
            };
            if let Err(e) = outcome {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Stop both listeners
    pub fn shutdown(&mut self) {
        info!("Stopping {} and {}", self.victim, self.attacker);
        self.tasks.abort_all();
    }
}
