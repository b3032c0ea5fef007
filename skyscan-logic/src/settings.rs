use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::matcher::{DEFAULT_MATCH_THRESHOLD, ProximityMatcher};

/// Bucket billboard photos are uploaded to
pub const DEFAULT_IMAGE_BUCKET: &str = "adminbillboard";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
/// Settings for the dashboard, loaded once at startup
pub struct DashboardSettings {
    /// Minimum confidence (out of 100) for a billboard to be suggested for a complaint
    pub match_threshold: u8,
    /// How long an admin session lasts
    pub session_ttl_minutes: u32,
    /// Largest image accepted for upload, in bytes
    pub max_upload_bytes: u64,
    /// Storage bucket for billboard images
    pub image_bucket: String,
}

impl DashboardSettings {
    pub fn matcher(&self) -> ProximityMatcher {
        ProximityMatcher::new(self.match_threshold)
    }

    pub fn session_ttl(&self) -> TimeDelta {
        TimeDelta::minutes(self.session_ttl_minutes as i64)
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            match_threshold: DEFAULT_MATCH_THRESHOLD,
            session_ttl_minutes: 8 * 60,
            max_upload_bytes: 10 * 1024 * 1024,
            image_bucket: DEFAULT_IMAGE_BUCKET.to_string(),
        }
    }
}
