//! Shared core types for the partsbay client workspace.
//!
//! Currently this is the session layer: the credential store abstraction the
//! API client reads its bearer token from, plus the credential set the token
//! endpoint issues.

pub mod session;

pub use session::{MemorySessionStore, SessionCredentials, SessionStore};
