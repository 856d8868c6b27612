//! Lab Core Library
//!
//! The request-routing and state-simulation harness behind the vulnerability
//! scenarios: request normalization, the in-memory domain store, exact-match
//! route tables and the dual-origin listener pair.

/// Configuration types and utilities
pub mod config;

/// Error types for harness operations
pub mod error;

pub mod logging;

/// Raw request → normalized context
pub mod request;

pub mod response;
pub mod router;
pub mod server;

/// Accounts, sessions and the article
pub mod store;

pub use config::{LabConfig, Mode, OriginConfig, SeedConfig};
pub use error::LabError;
pub use logging::{init_logging, LoggingConfig};
pub use request::{parse_cookies, parse_form, parse_query, RequestContext};
pub use router::{method_path_key, Handler, KeyStrategy, RouteTable};
pub use server::{BoundLab, DualOriginServer, LabHandle, Origin};
pub use store::{Article, StateStore, TransferReceipt};

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, LabError>;
