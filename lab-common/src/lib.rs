//! Common wire types for the lab crates
//!
//! Cookie rendering and the plaintext session token are shared between the
//! harness (`lab-core`) and the scenario handlers (`vuln-lab`).

pub mod cookie;
pub mod session;

pub use cookie::{SameSite, SetCookie};
pub use session::{SessionToken, SESSION_COOKIE};
