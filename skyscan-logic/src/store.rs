use crate::{
    billboard::Billboard,
    complaint::{Complaint, ComplaintStatus, ReportId},
    prelude::*,
};

/// Access to wherever billboards, complaints, and images live. Handed to
/// [Dashboard](crate::Dashboard) explicitly, nothing here is global.
pub trait DataStore: Send + Sync {
    /// Every registered billboard, unfiltered
    fn list_billboards(&self) -> impl Future<Output = Result<Vec<Billboard>>> + Send;
    /// Check if a billboard with this ID has already been registered
    fn billboard_exists(&self, id: &str) -> impl Future<Output = Result<bool>> + Send;
    fn insert_billboard(&self, billboard: &Billboard) -> impl Future<Output = Result> + Send;
    /// Every complaint, unfiltered
    fn list_complaints(&self) -> impl Future<Output = Result<Vec<Complaint>>> + Send;
    fn get_complaint(
        &self,
        report_id: ReportId,
    ) -> impl Future<Output = Result<Option<Complaint>>> + Send;
    /// Set the status of a complaint along with what was done about it
    fn update_complaint_status(
        &self,
        report_id: ReportId,
        status: &ComplaintStatus,
        action_taken: &str,
    ) -> impl Future<Output = Result> + Send;
    /// Store an image, never overwriting an existing object. Returns the image's public URL.
    fn upload_image(
        &self,
        bucket: &str,
        object_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<String>> + Send;
}
