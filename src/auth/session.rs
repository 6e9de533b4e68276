use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::store::{FileStore, MemoryStore, SessionStore, StoreKey, Tier};

/// Session file name inside the data directory (durable tier)
const SESSION_FILE: &str = "session.json";

/// The fields cached at login. `user` is kept opaque; the data layer never
/// inspects it beyond storing and returning it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
    #[serde(rename = "expiresAt", default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionData {
    /// Expired when an expiry was cached and has passed. A session without
    /// an expiry is treated as live; the server is the authority via 401.
    pub fn is_expired(&self) -> bool {
        self.expires_at.map(|at| Utc::now() > at).unwrap_or(false)
    }
}

/// The two-tier session storage with its fallback-order policy.
///
/// The durable tier is preferred when the remember-me flag is set, the
/// ephemeral tier otherwise. Reads always probe the full fallback chain, so
/// a token written to the "wrong" tier (e.g. after a partial logout) is
/// still recovered.
pub struct AuthVault {
    durable: Box<dyn SessionStore>,
    ephemeral: Box<dyn SessionStore>,
}

impl AuthVault {
    pub fn new(durable: Box<dyn SessionStore>, ephemeral: Box<dyn SessionStore>) -> Self {
        Self { durable, ephemeral }
    }

    /// Standard production wiring: file-backed durable tier under the data
    /// directory, in-memory ephemeral tier.
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self::new(
            Box::new(FileStore::new(data_dir.join(SESSION_FILE))),
            Box::new(MemoryStore::new()),
        )
    }

    /// Fully in-memory vault, for tests and throwaway sessions.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::new()), Box::new(MemoryStore::new()))
    }

    /// Direct access to one tier. Most callers want the fallback-aware
    /// readers below instead.
    pub fn store(&self, tier: Tier) -> &dyn SessionStore {
        match tier {
            Tier::Durable => self.durable.as_ref(),
            Tier::Ephemeral => self.ephemeral.as_ref(),
        }
    }

    /// Probe order for reads: preferred tier, then the other, then durable.
    /// The trailing durable probe is redundant when remember is set but is
    /// kept as the explicit policy; recovery after a partial logout depends
    /// on always reaching the durable tier.
    pub fn fallback_order(remember: bool) -> [Tier; 3] {
        if remember {
            [Tier::Durable, Tier::Ephemeral, Tier::Durable]
        } else {
            [Tier::Ephemeral, Tier::Durable, Tier::Durable]
        }
    }

    fn read_with_fallback(&self, key: StoreKey) -> Option<String> {
        let remember = self.remember();
        for tier in Self::fallback_order(remember) {
            if let Some(value) = self.store(tier).get(key) {
                return Some(value);
            }
        }
        None
    }

    /// The remember-me flag itself is probed durable-first: a persisted
    /// preference outlives the process that set it.
    pub fn remember(&self) -> bool {
        self.durable
            .get(StoreKey::RememberMe)
            .or_else(|| self.ephemeral.get(StoreKey::RememberMe))
            .map(|v| v == "true")
            .unwrap_or(false)
    }

    /// Resolve the bearer token for a request. Called before every request,
    /// never cached, so a teardown elsewhere takes effect on the next call.
    pub fn resolve_token(&self) -> Option<String> {
        self.read_with_fallback(StoreKey::Token)
    }

    /// The cached user object from login, if any tier still holds it.
    pub fn cached_user(&self) -> Option<serde_json::Value> {
        let raw = self.read_with_fallback(StoreKey::User)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                debug!(error = %e, "Ignoring unparseable cached user");
                None
            }
        }
    }

    /// The cached token expiry, if any tier still holds it.
    pub fn token_expiry(&self) -> Option<DateTime<Utc>> {
        let raw = self.read_with_fallback(StoreKey::TokenExpiry)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                debug!(error = %e, "Ignoring unparseable token expiry");
                None
            }
        }
    }

    /// Write a full session to the tier selected by `remember`.
    ///
    /// The other tier is evicted first: a leftover session there would
    /// shadow this one through the fallback chain, most visibly when a
    /// remembered login is followed by a non-remembered one.
    pub fn store_session(&self, data: &SessionData, remember: bool) -> Result<()> {
        let tier = if remember { Tier::Durable } else { Tier::Ephemeral };
        let other = if remember { Tier::Ephemeral } else { Tier::Durable };
        for key in StoreKey::ALL {
            self.store(other).remove(key)?;
        }
        let store = self.store(tier);
        store.set(StoreKey::Token, &data.token)?;
        store.set(StoreKey::RememberMe, if remember { "true" } else { "false" })?;
        if let Some(ref user) = data.user {
            store.set(StoreKey::User, &user.to_string())?;
        }
        if let Some(expires_at) = data.expires_at {
            store.set(StoreKey::TokenExpiry, &expires_at.to_rfc3339())?;
        }
        Ok(())
    }

    /// Remove every session key from both tiers. Used by logout and by the
    /// 401 teardown path.
    pub fn clear(&self) -> Result<()> {
        for tier in [Tier::Durable, Tier::Ephemeral] {
            for key in StoreKey::ALL {
                self.store(tier).remove(key)?;
            }
        }
        Ok(())
    }
}
