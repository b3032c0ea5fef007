use std::fmt;

use chrono::Utc;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::{
    billboard::{Billboard, BillboardForm, RegistrationError},
    complaint::{
        CategoryCount, Complaint, ComplaintCategory, ComplaintStatus, ReportId, TriageAction,
        open_counts,
    },
    matcher::{MatchResult, ProximityMatcher, RegisteredAsset},
    prelude::*,
    session::AdminSession,
    settings::DashboardSettings,
    store::DataStore,
    upload::object_name,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors the dashboard reports back to the admin, these are refusals rather than failures
pub enum DashboardError {
    /// No complaint has the given report ID
    NotFound(ReportId),
    /// A billboard with this ID is already registered
    DuplicateId(String),
    /// The admin's session has expired, they need a new one
    SessionExpired,
    /// Rejecting or completing a complaint needs a reason
    MissingReason,
    /// Image is bigger than the configured limit
    UploadTooLarge { size: u64, limit: u64 },
    /// Registration form didn't validate
    Registration(RegistrationError),
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "Complaint {id} not found."),
            Self::DuplicateId(id) => write!(f, "A billboard with ID {id} already exists."),
            Self::SessionExpired => write!(f, "Session expired, please log in again."),
            Self::MissingReason => write!(f, "A reason is required for this action."),
            Self::UploadTooLarge { size, limit } => {
                write!(f, "File size must be less than {limit} bytes (got {size}).")
            }
            Self::Registration(why) => write!(f, "{why}"),
        }
    }
}

impl std::error::Error for DashboardError {}

impl From<RegistrationError> for DashboardError {
    fn from(v: RegistrationError) -> Self {
        Self::Registration(v)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A complaint along with the billboard it most likely refers to
pub struct ComplaintDetail {
    pub complaint: Complaint,
    pub suggested: Option<MatchResult>,
}

/// The admin dashboard, ties the matcher and triage rules to a [DataStore].
pub struct Dashboard<S: DataStore> {
    store: S,
    settings: DashboardSettings,
    matcher: ProximityMatcher,
}

impl<S: DataStore> Dashboard<S> {
    pub fn new(store: S, settings: DashboardSettings) -> Self {
        let matcher = settings.matcher();
        Self {
            store,
            settings,
            matcher,
        }
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn matcher(&self) -> ProximityMatcher {
        self.matcher
    }

    /// Start a session for an admin, valid for the configured TTL
    pub fn issue_session(&self, admin: impl Into<String>) -> AdminSession {
        AdminSession::issue(admin, self.settings.session_ttl())
    }

    fn check_session(session: &AdminSession) -> Result {
        if session.is_valid() {
            Ok(())
        } else {
            warn!("Refusing request from expired session of {}", session.admin());
            Err(DashboardError::SessionExpired.into())
        }
    }

    pub async fn list_billboards(&self) -> Result<Vec<Billboard>> {
        self.store
            .list_billboards()
            .await
            .context("Failed to fetch billboards")
    }

    pub async fn list_complaints(&self) -> Result<Vec<Complaint>> {
        self.store
            .list_complaints()
            .await
            .context("Failed to fetch complaints")
    }

    /// All complaints filed under a category
    pub async fn complaints_in(&self, category: ComplaintCategory) -> Result<Vec<Complaint>> {
        let complaints = self.list_complaints().await?;
        Ok(complaints
            .into_iter()
            .filter(|c| c.is_in(category))
            .collect())
    }

    /// Number of complaints still under review for each category
    pub async fn open_counts(&self) -> Result<Vec<CategoryCount>> {
        let complaints = self.list_complaints().await?;
        Ok(open_counts(&complaints))
    }

    async fn registered_assets(&self) -> Result<Vec<RegisteredAsset>> {
        let billboards = self.list_billboards().await?;
        Ok(billboards.iter().map(RegisteredAsset::from).collect())
    }

    async fn fetch_complaint(&self, report_id: ReportId) -> Result<Complaint> {
        self.store
            .get_complaint(report_id)
            .await
            .context("Failed to fetch complaint")?
            .ok_or_else(|| DashboardError::NotFound(report_id).into())
    }

    /// Get a complaint and suggest which registered billboard it's about
    pub async fn complaint_detail(&self, report_id: ReportId) -> Result<ComplaintDetail> {
        let complaint = self.fetch_complaint(report_id).await?;
        let assets = self.registered_assets().await?;
        let suggested = self.matcher.find_best_match(complaint.location(), &assets);

        Ok(ComplaintDetail {
            complaint,
            suggested,
        })
    }

    /// Every registered billboard scored against a complaint's location, best first
    pub async fn ranked_candidates(&self, complaint: &Complaint) -> Result<Vec<MatchResult>> {
        let assets = self.registered_assets().await?;
        Ok(self.matcher.rank(complaint.location(), &assets))
    }

    /// Apply a triage action to a complaint, returns the complaint's new status
    pub async fn update_status(
        &self,
        session: &AdminSession,
        report_id: ReportId,
        action: TriageAction,
    ) -> Result<ComplaintStatus> {
        Self::check_session(session)?;

        let (status, action_taken) = action.resolve().ok_or(DashboardError::MissingReason)?;

        self.fetch_complaint(report_id).await?;

        self.store
            .update_complaint_status(report_id, &status, &action_taken)
            .await
            .context("Failed to update complaint status")?;

        info!("{} set complaint {report_id} to {status}", session.admin());

        Ok(status)
    }

    async fn check_new_billboard(&self, form: &BillboardForm) -> Result<Billboard> {
        let billboard = form.validate().map_err(DashboardError::from)?;

        let exists = self
            .store
            .billboard_exists(&billboard.id)
            .await
            .context("Error checking for duplicate ID")?;

        if exists {
            warn!("Refusing to register duplicate billboard {}", billboard.id);
            return Err(DashboardError::DuplicateId(billboard.id).into());
        }

        Ok(billboard)
    }

    async fn insert_billboard(
        &self,
        session: &AdminSession,
        billboard: Billboard,
    ) -> Result<Billboard> {
        self.store
            .insert_billboard(&billboard)
            .await
            .context("Registration failed")?;

        info!("{} registered billboard {}", session.admin(), billboard.id);

        Ok(billboard)
    }

    /// Validate and register a new billboard, refusing IDs that are already taken
    pub async fn register_billboard(
        &self,
        session: &AdminSession,
        form: &BillboardForm,
    ) -> Result<Billboard> {
        Self::check_session(session)?;
        let billboard = self.check_new_billboard(form).await?;
        self.insert_billboard(session, billboard).await
    }

    /// Register a new billboard along with its photo. The photo is only uploaded once the rest
    /// of the form is valid and the ID is free, so a refused registration leaves nothing behind
    /// in storage.
    pub async fn register_billboard_with_image(
        &self,
        session: &AdminSession,
        form: &BillboardForm,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Billboard> {
        Self::check_session(session)?;

        // Stand-in until the upload gives us the real URL
        let pending = BillboardForm {
            image_url: file_name.to_string(),
            ..form.clone()
        };
        let mut billboard = self.check_new_billboard(&pending).await?;

        billboard.image_url = self.upload_image(session, file_name, bytes).await?;

        self.insert_billboard(session, billboard).await
    }

    /// Upload a billboard image to the configured bucket, returns its public URL
    pub async fn upload_image(
        &self,
        session: &AdminSession,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        Self::check_session(session)?;

        let size = bytes.len() as u64;
        let limit = self.settings.max_upload_bytes;
        if size > limit {
            return Err(DashboardError::UploadTooLarge { size, limit }.into());
        }

        let name = object_name(file_name, Utc::now());

        let url = self
            .store
            .upload_image(&self.settings.image_bucket, &name, bytes)
            .await
            .context("Image upload failed")?;

        info!("Uploaded {file_name} as {name}");

        Ok(url)
    }
}
