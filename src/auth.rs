use actix_web::HttpRequest;
use chrono::Duration;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::helpers::{now, validate_uuid};
use crate::models::models::TokenData;
use crate::repository::Repository;

/// Bearer tokens issued at login, kept in memory with a fixed lifetime.
#[derive(Debug)]
pub struct SessionStore {
    tokens: RwLock<HashMap<String, TokenData>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(expiration_hours: i64) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            ttl: Duration::hours(expiration_hours),
        }
    }

    /// Checks the credential and issues a fresh token. `None` covers both
    /// unknown handles and wrong passwords.
    pub fn login(&self, repo: &Repository, handle: &str, password: &str) -> Option<String> {
        if !repo.verify_credential(handle, password) {
            warn!(handle = %handle, "failed login");
            return None;
        }
        // Store the handle in its canonical form so later lookups match.
        let profile = repo.get_profile(handle).ok()?;
        let token = Uuid::new_v4().to_string();
        self.tokens.write().insert(
            token.clone(),
            TokenData {
                handle: profile.handle,
                created_at: now(),
            },
        );
        Some(token)
    }

    pub fn logout(&self, token: &str) -> bool {
        self.tokens.write().remove(token).is_some()
    }

    /// Handle bound to `token`, if the token is known and not expired.
    /// Expired tokens are evicted.
    pub fn resolve(&self, token: &str) -> Option<String> {
        if !validate_uuid(token) {
            return None;
        }
        let data = self.tokens.read().get(token).cloned()?;
        if now() - data.created_at > self.ttl {
            warn!(handle = %data.handle, "expired token");
            self.tokens.write().remove(token);
            return None;
        }
        Some(data.handle)
    }

    /// Removes every expired token; returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let cutoff = now() - self.ttl;
        let mut tokens = self.tokens.write();
        let before = tokens.len();
        tokens.retain(|_, data| data.created_at >= cutoff);
        let purged = before - tokens.len();
        if purged > 0 {
            debug!(purged, "purged expired tokens");
        }
        purged
    }

    pub fn len(&self) -> usize {
        self.tokens.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.read().is_empty()
    }
}

pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

pub fn validate_token(req: &HttpRequest, sessions: &SessionStore) -> Option<String> {
    sessions.resolve(bearer_token(req)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_logout_cycle() {
        let repo = Repository::new();
        repo.register("rich", "rich@hello.com", "", "", "buttons").unwrap();
        let sessions = SessionStore::new(24);

        assert!(sessions.login(&repo, "rich", "wrong").is_none());
        assert!(sessions.login(&repo, "nobody", "buttons").is_none());

        let token = sessions.login(&repo, "rich", "buttons").unwrap();
        assert_eq!(sessions.resolve(&token).as_deref(), Some("rich"));
        assert!(sessions.logout(&token));
        assert!(sessions.resolve(&token).is_none());
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let repo = Repository::new();
        repo.register("rich", "rich@hello.com", "", "", "buttons").unwrap();
        let sessions = SessionStore::new(-1);

        let token = sessions.login(&repo, "rich", "buttons").unwrap();
        assert!(sessions.resolve(&token).is_none());
        assert!(sessions.is_empty());
    }

    #[test]
    fn purge_drops_only_expired() {
        let repo = Repository::new();
        repo.register("rich", "rich@hello.com", "", "", "buttons").unwrap();
        let live = SessionStore::new(24);
        live.login(&repo, "rich", "buttons").unwrap();
        assert_eq!(live.purge_expired(), 0);
        assert_eq!(live.len(), 1);

        let stale = SessionStore::new(-1);
        stale.login(&repo, "rich", "buttons").unwrap();
        assert_eq!(stale.purge_expired(), 1);
    }
}
