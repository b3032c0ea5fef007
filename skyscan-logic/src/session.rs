use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::UtcDT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// An admin's session, only good until `expires_at`
pub struct AdminSession {
    token: Uuid,
    admin: String,
    issued_at: UtcDT,
    expires_at: UtcDT,
}

impl AdminSession {
    pub fn issue(admin: impl Into<String>, ttl: TimeDelta) -> Self {
        Self::issue_at(admin, ttl, Utc::now())
    }

    pub fn issue_at(admin: impl Into<String>, ttl: TimeDelta, now: UtcDT) -> Self {
        Self {
            token: Uuid::new_v4(),
            admin: admin.into(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn admin(&self) -> &str {
        &self.admin
    }

    pub fn issued_at(&self) -> UtcDT {
        self.issued_at
    }

    pub fn expires_at(&self) -> UtcDT {
        self.expires_at
    }

    pub fn is_valid_at(&self, now: UtcDT) -> bool {
        now < self.expires_at
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}
