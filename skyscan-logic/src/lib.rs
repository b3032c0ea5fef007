mod billboard;
mod complaint;
mod dashboard;
mod geo;
mod matcher;
mod session;
mod settings;
mod store;
mod upload;

use chrono::{DateTime, Utc};

/// Convenience alias for UTC DT
pub type UtcDT = DateTime<Utc>;

pub use billboard::{ACTIVE_STATUS, Billboard, BillboardForm, RegistrationError};
pub use complaint::{
    CategoryCount, Complaint, ComplaintCategory, ComplaintStatus, ReportId, TriageAction,
    open_counts,
};
pub use dashboard::{ComplaintDetail, Dashboard, DashboardError};
pub use geo::{Coordinate, EARTH_RADIUS_KM, GeoPoint, distance_km};
pub use matcher::{
    DEFAULT_MATCH_THRESHOLD, MatchResult, ProximityMatcher, RegisteredAsset, confidence,
    find_best_match,
};
pub use session::AdminSession;
pub use settings::{DEFAULT_IMAGE_BUCKET, DashboardSettings};
pub use store::DataStore;
pub use upload::object_name;

pub mod prelude {
    use anyhow::Error as AnyhowError;
    use std::result::Result as StdResult;
    pub type Result<T = (), E = AnyhowError> = StdResult<T, E>;
    pub use anyhow::Context;
}
