//! Authentication module for managing user sessions.
//!
//! This module provides:
//! - `AuthVault`: two-tier session storage with an explicit fallback policy
//! - `SessionStore`: the storage backend trait, with file and memory impls
//! - `SessionData`: the token/user/expiry bundle cached at login
//!
//! The durable tier is selected by the remember-me flag; reads fall back
//! across tiers so a token stranded in the other tier is still found.

pub mod session;
pub mod store;

pub use session::{AuthVault, SessionData};
pub use store::{FileStore, MemoryStore, SessionStore, StoreKey, Tier};
