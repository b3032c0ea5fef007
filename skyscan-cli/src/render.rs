use serde::Serialize;
use skyscan_logic::{
    Billboard, CategoryCount, Complaint, ComplaintCategory, ComplaintDetail, ComplaintStatus,
    MatchResult, ReportId, prelude::*,
};

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct DistanceReport {
    pub distance_km: f64,
    pub confidence: u8,
}

/// Prints command results either as human readable text or as JSON
pub struct Output {
    json: bool,
}

fn submitted_at(complaint: &Complaint) -> String {
    complaint
        .timestamp
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default()
}

fn complaint_line(complaint: &Complaint) -> String {
    format!(
        "#{:<6} {:<14} {:<13} {:<17} {}",
        complaint.report_id,
        complaint.report_type,
        complaint.status,
        submitted_at(complaint),
        complaint.issue
    )
}

fn match_line(m: &MatchResult) -> String {
    format!(
        "{} ({}% match) at {:.6}, {:.6}",
        m.asset.id, m.confidence, m.asset.location.latitude, m.asset.location.longitude
    )
}

fn complaints_text(complaints: &[Complaint], category: Option<ComplaintCategory>) -> String {
    if complaints.is_empty() {
        return match category {
            Some(category) => format!("No complaints in the {} category.", category.title()),
            None => "No complaints found.".to_string(),
        };
    }

    complaints
        .iter()
        .map(complaint_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn detail_text(detail: &ComplaintDetail, threshold: u8, ranked: Option<&[MatchResult]>) -> String {
    let c = &detail.complaint;
    let mut lines = vec![
        format!("Report ID:     {}", c.report_id),
        format!("User ID:       {}", c.user_id),
        format!("Submitted At:  {}", submitted_at(c)),
        format!("User Location: {}, {}", c.gps_latitude, c.gps_longitude),
        format!("Status:        {}", c.status),
        format!("Category:      {}", c.report_type),
        format!("Issue:         {}", c.issue),
        format!("Photo:         {}", c.image_url),
    ];

    if let Some(action) = c.action_taken.as_deref().filter(|a| !a.is_empty()) {
        lines.push(format!("Action Taken:  {action}"));
    }

    match &detail.suggested {
        Some(m) => lines.push(format!("High probability match: {}", match_line(m))),
        None => lines.push(format!("No billboard matched with at least {threshold}% confidence")),
    }

    if let Some(ranked) = ranked {
        lines.push("Candidates:".to_string());
        lines.extend(ranked.iter().map(|m| format!("  {}", match_line(m))));
    }

    lines.join("\n")
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce() -> String) -> Result {
        if self.json {
            let raw = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
            println!("{raw}");
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    pub fn distance(&self, report: &DistanceReport) -> Result {
        self.emit(report, || {
            format!(
                "{:.4} km apart, {}% match confidence",
                report.distance_km, report.confidence
            )
        })
    }

    pub fn complaints(
        &self,
        complaints: &[Complaint],
        category: Option<ComplaintCategory>,
    ) -> Result {
        self.emit(complaints, || complaints_text(complaints, category))
    }

    pub fn counts(&self, counts: &[CategoryCount]) -> Result {
        self.emit(counts, || {
            counts
                .iter()
                .map(|c| {
                    format!(
                        "{:<20} {:>4} open\n  {}",
                        c.category.title(),
                        c.open,
                        c.category.description()
                    )
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
    }

    pub fn detail(
        &self,
        detail: &ComplaintDetail,
        threshold: u8,
        ranked: Option<&[MatchResult]>,
    ) -> Result {
        if self.json {
            #[derive(Serialize)]
            struct DetailJson<'a> {
                #[serde(flatten)]
                detail: &'a ComplaintDetail,
                threshold: u8,
                #[serde(skip_serializing_if = "Option::is_none")]
                candidates: Option<&'a [MatchResult]>,
            }

            self.emit(
                &DetailJson {
                    detail,
                    threshold,
                    candidates: ranked,
                },
                String::new,
            )
        } else {
            println!("{}", detail_text(detail, threshold, ranked));
            Ok(())
        }
    }

    pub fn status(&self, report_id: ReportId, status: &ComplaintStatus) -> Result {
        #[derive(Serialize)]
        struct StatusJson<'a> {
            report_id: ReportId,
            status: &'a ComplaintStatus,
        }

        self.emit(&StatusJson { report_id, status }, || {
            format!("Complaint {report_id} is now {status}")
        })
    }

    pub fn billboard(&self, billboard: &Billboard) -> Result {
        self.emit(billboard, || {
            format!("Billboard {} registered successfully!", billboard.id)
        })
    }

    pub fn url(&self, url: &str) -> Result {
        self.emit(url, || url.to_string())
    }
}
