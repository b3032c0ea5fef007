use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{UtcDT, geo::GeoPoint};

pub type ReportId = i64;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
/// What a citizen says is wrong with a billboard
pub enum ComplaintCategory {
    /// Structural integrity, electrical issues, or immediate public danger
    Hazardous,
    /// Violates local laws, permits, or placement restrictions
    Illegal,
    /// Offensive, misleading, or otherwise inappropriate content
    Inappropriate,
}

impl ComplaintCategory {
    pub const ALL: [Self; 3] = [Self::Hazardous, Self::Illegal, Self::Inappropriate];

    /// The `report_type` value used by the backend
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hazardous => "Hazardous",
            Self::Illegal => "Illegal",
            Self::Inappropriate => "Inappropriate",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Hazardous => "Hazardous (Danger)",
            Self::Illegal => "Illegal",
            Self::Inappropriate => "Inappropriate",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Hazardous => {
                "Complaints related to structural integrity, electrical issues, or immediate public danger."
            }
            Self::Illegal => {
                "Complaints about billboards that violate local laws, permits, or placement restrictions."
            }
            Self::Inappropriate => {
                "Complaints regarding offensive, misleading, or otherwise inappropriate content."
            }
        }
    }

    pub fn from_report_type(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "Option<String>", into = "String")]
/// Where a complaint is in triage. The backend stores this as free text so anything unknown is
/// kept as-is, a null status becomes an empty [ComplaintStatus::Other].
pub enum ComplaintStatus {
    Pending,
    UnderReview,
    Working,
    Completed,
    Rejected,
    Other(String),
}

impl ComplaintStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::UnderReview => "Under Review",
            Self::Working => "Working",
            Self::Completed => "Completed",
            Self::Rejected => "Rejected",
            Self::Other(s) => s,
        }
    }

    /// Open complaints still need an admin to look at them
    pub fn is_open(&self) -> bool {
        matches!(self, Self::UnderReview)
    }
}

impl From<String> for ComplaintStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "under review" => Self::UnderReview,
            "working" => Self::Working,
            "completed" => Self::Completed,
            "rejected" => Self::Rejected,
            _ => Self::Other(raw),
        }
    }
}

impl From<Option<String>> for ComplaintStatus {
    fn from(raw: Option<String>) -> Self {
        raw.unwrap_or_default().into()
    }
}

impl Default for ComplaintStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for ComplaintStatus {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<ComplaintStatus> for String {
    fn from(status: ComplaintStatus) -> Self {
        match status {
            ComplaintStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A complaint ("report") submitted by a citizen, with the photo's GPS tag
pub struct Complaint {
    pub report_id: ReportId,
    pub image_url: String,
    pub gps_latitude: f64,
    pub gps_longitude: f64,
    /// When the photo was taken, some older reports don't have one
    #[serde(default)]
    pub timestamp: Option<UtcDT>,
    #[serde(default)]
    pub status: ComplaintStatus,
    pub issue: String,
    pub user_id: String,
    pub report_type: String,
    /// What the admin did about it, filled on rejection or completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_taken: Option<String>,
}

impl Complaint {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.gps_latitude, self.gps_longitude)
    }

    pub fn category(&self) -> Option<ComplaintCategory> {
        ComplaintCategory::from_report_type(&self.report_type)
    }

    pub fn is_in(&self, category: ComplaintCategory) -> bool {
        self.report_type == category.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Something an admin can do to a complaint
pub enum TriageAction {
    /// Reject the complaint, contains the reason
    Reject(String),
    /// Mark that work on the billboard has started
    MarkWorking,
    /// Mark the complaint resolved, contains what was done
    Complete(String),
}

impl TriageAction {
    /// The status and `action_taken` text this action results in, [None] if the action needs a
    /// reason and didn't get one.
    pub fn resolve(&self) -> Option<(ComplaintStatus, String)> {
        match self {
            Self::MarkWorking => Some((ComplaintStatus::Working, String::new())),
            Self::Reject(reason) | Self::Complete(reason) if reason.trim().is_empty() => None,
            Self::Reject(reason) => Some((ComplaintStatus::Rejected, reason.trim().to_string())),
            Self::Complete(reason) => Some((ComplaintStatus::Completed, reason.trim().to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: ComplaintCategory,
    /// Number of complaints still under review
    pub open: usize,
}

/// Count open complaints per category, in [ComplaintCategory::ALL] order.
pub fn open_counts<'a>(complaints: impl IntoIterator<Item = &'a Complaint>) -> Vec<CategoryCount> {
    let mut counts = ComplaintCategory::ALL.map(|category| CategoryCount { category, open: 0 });

    for complaint in complaints {
        if !complaint.status.is_open() {
            continue;
        }
        if let Some(count) = counts.iter_mut().find(|c| complaint.is_in(c.category)) {
            count.open += 1;
        }
    }

    counts.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mk_complaint;

    #[test]
    fn test_status_parsing() {
        assert_eq!(ComplaintStatus::from("under review"), ComplaintStatus::UnderReview);
        assert_eq!(ComplaintStatus::from("Under Review"), ComplaintStatus::UnderReview);
        assert_eq!(ComplaintStatus::from("UNDER REVIEW "), ComplaintStatus::UnderReview);
        assert_eq!(ComplaintStatus::from("Completed"), ComplaintStatus::Completed);
        assert_eq!(
            ComplaintStatus::from("Escalated"),
            ComplaintStatus::Other("Escalated".to_string())
        );

        assert_eq!(ComplaintStatus::from(None), ComplaintStatus::Other(String::new()));
        assert!(!ComplaintStatus::default().is_open());

        assert_eq!(String::from(ComplaintStatus::Rejected), "Rejected");
        assert_eq!(
            String::from(ComplaintStatus::Other("Escalated".to_string())),
            "Escalated"
        );
    }

    #[test]
    fn test_category_lookup() {
        assert_eq!(
            ComplaintCategory::from_report_type("Illegal"),
            Some(ComplaintCategory::Illegal)
        );
        assert_eq!(ComplaintCategory::from_report_type("illegal"), None);
        assert_eq!(ComplaintCategory::from_report_type("Noise"), None);
        assert_eq!(ComplaintCategory::Hazardous.title(), "Hazardous (Danger)");
    }

    #[test]
    fn test_triage_actions() {
        assert_eq!(
            TriageAction::MarkWorking.resolve(),
            Some((ComplaintStatus::Working, String::new()))
        );
        assert_eq!(
            TriageAction::Reject(" Duplicate complaint ".to_string()).resolve(),
            Some((ComplaintStatus::Rejected, "Duplicate complaint".to_string()))
        );
        assert_eq!(
            TriageAction::Complete("Repaired structural damage".to_string()).resolve(),
            Some((
                ComplaintStatus::Completed,
                "Repaired structural damage".to_string()
            ))
        );
        assert_eq!(TriageAction::Reject("  ".to_string()).resolve(), None);
        assert_eq!(TriageAction::Complete(String::new()).resolve(), None);
    }

    #[test]
    fn test_open_counts() {
        let complaints = vec![
            mk_complaint(1, "Hazardous", "Under Review"),
            mk_complaint(2, "Hazardous", "under review"),
            mk_complaint(3, "Hazardous", "Pending"),
            mk_complaint(4, "Illegal", "Completed"),
            mk_complaint(5, "Inappropriate", "UNDER REVIEW"),
            mk_complaint(6, "Noise", "Under Review"),
        ];

        let counts = open_counts(&complaints);

        assert_eq!(
            counts,
            vec![
                CategoryCount {
                    category: ComplaintCategory::Hazardous,
                    open: 2
                },
                CategoryCount {
                    category: ComplaintCategory::Illegal,
                    open: 0
                },
                CategoryCount {
                    category: ComplaintCategory::Inappropriate,
                    open: 1
                },
            ]
        );
    }
}
