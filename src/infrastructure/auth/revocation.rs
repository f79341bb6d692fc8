use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;

/// Signed-out token ids, each kept until the token would have expired anyway.
#[derive(Debug, Clone, Default)]
pub struct RevocationList {
    revoked: Arc<DashMap<String, usize>>,
}

impl RevocationList {
    pub fn new() -> Self {
        RevocationList::default()
    }

    /// `expires_at` is the token's `exp` claim (unix seconds).
    pub fn revoke(&self, jti: &str, expires_at: usize) {
        self.revoked.insert(jti.to_string(), expires_at);
    }

    pub fn is_revoked(&self, jti: &str) -> bool {
        self.revoked.contains_key(jti)
    }

    /// Drops entries whose tokens have expired. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now().timestamp().max(0) as usize;
        let before = self.revoked.len();
        self.revoked.retain(|_, expires_at| *expires_at > now);
        before - self.revoked.len()
    }

    pub fn len(&self) -> usize {
        self.revoked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revoked.is_empty()
    }
}
