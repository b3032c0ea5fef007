mod render;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::debug;
use skyscan_logic::{
    BillboardForm, ComplaintCategory, Dashboard, DashboardSettings, GeoPoint, ReportId,
    TriageAction, confidence, distance_km, prelude::*,
};
use skyscan_store::{HostedStore, StoreConfig};

use crate::render::{DistanceReport, Output};

#[derive(Parser)]
#[command(name = "skyscan", version, about)]
struct Cli {
    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// JSON file with dashboard settings, defaults are used for anything missing
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Name recorded as the admin taking actions, defaults to $USER
    #[arg(long, global = true)]
    admin: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CategoryValue {
    Hazardous,
    Illegal,
    Inappropriate,
}

impl From<CategoryValue> for ComplaintCategory {
    fn from(value: CategoryValue) -> Self {
        match value {
            CategoryValue::Hazardous => ComplaintCategory::Hazardous,
            CategoryValue::Illegal => ComplaintCategory::Illegal,
            CategoryValue::Inappropriate => ComplaintCategory::Inappropriate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ActionValue {
    Reject,
    Working,
    Complete,
}

#[derive(Subcommand)]
enum Commands {
    /// List complaints, optionally only those in one category
    Complaints {
        #[arg(long, value_enum)]
        category: Option<CategoryValue>,
    },
    /// Show how many complaints are still under review in each category
    Counts,
    /// Show a complaint and the billboard it most likely refers to
    Show {
        report_id: ReportId,
        /// Minimum confidence for a suggestion, overrides the settings file
        #[arg(long)]
        threshold: Option<u8>,
        /// Also list every billboard with its confidence
        #[arg(long)]
        all: bool,
    },
    /// Change the status of a complaint
    Status {
        report_id: ReportId,
        #[arg(value_enum)]
        action: ActionValue,
        /// Why it was rejected, or what was done to complete it
        #[arg(long)]
        reason: Option<String>,
    },
    /// Register a new billboard
    Register {
        #[arg(long)]
        id: String,
        #[arg(long, allow_negative_numbers = true)]
        lat: String,
        #[arg(long, allow_negative_numbers = true)]
        lon: String,
        #[arg(long)]
        size: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        owner: String,
        /// First day the permit is valid (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Last day the permit is valid (YYYY-MM-DD)
        #[arg(long)]
        to: String,
        /// URL of an already uploaded photo
        #[arg(long, conflicts_with = "image")]
        image_url: Option<String>,
        /// Photo to upload before registering
        #[arg(long)]
        image: Option<PathBuf>,
    },
    /// Upload an image and print its public URL
    Upload {
        path: PathBuf,
        /// Storage bucket, overrides the settings file
        #[arg(long)]
        bucket: Option<String>,
    },
    /// Distance and match confidence between two points, no backend needed
    Distance {
        #[arg(allow_negative_numbers = true)]
        lat1: f64,
        #[arg(allow_negative_numbers = true)]
        lon1: f64,
        #[arg(allow_negative_numbers = true)]
        lat2: f64,
        #[arg(allow_negative_numbers = true)]
        lon2: f64,
    },
}

async fn load_settings(path: Option<&Path>) -> Result<DashboardSettings> {
    let Some(path) = path else {
        return Ok(DashboardSettings::default());
    };

    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    serde_json::from_str(&raw).context("Failed to parse settings")
}

fn connect(settings: DashboardSettings) -> Result<Dashboard<HostedStore>> {
    let config = StoreConfig::from_env().context("Backend is not configured")?;
    debug!("Using backend at {}", config.base_url);
    let store = HostedStore::new(config)?;
    Ok(Dashboard::new(store, settings))
}

async fn read_image(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("Image path has no file name")?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok((name, bytes))
}

fn triage_action(action: ActionValue, reason: Option<String>) -> TriageAction {
    let reason = reason.unwrap_or_default();
    match action {
        ActionValue::Reject => TriageAction::Reject(reason),
        ActionValue::Working => TriageAction::MarkWorking,
        ActionValue::Complete => TriageAction::Complete(reason),
    }
}

#[tokio::main]
async fn main() -> Result {
    colog::init();

    let cli = Cli::parse();
    let out = Output::new(cli.json);

    let mut settings = load_settings(cli.settings.as_deref()).await?;
    let admin = cli
        .admin
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "admin".to_string());

    match cli.command {
        Commands::Distance {
            lat1,
            lon1,
            lat2,
            lon2,
        } => {
            let d = distance_km(GeoPoint::new(lat1, lon1), GeoPoint::new(lat2, lon2));
            out.distance(&DistanceReport {
                distance_km: d,
                confidence: confidence(d),
            })
        }
        Commands::Complaints { category } => {
            let dash = connect(settings)?;
            let category = category.map(ComplaintCategory::from);
            let complaints = match category {
                Some(category) => dash.complaints_in(category).await?,
                None => dash.list_complaints().await?,
            };
            out.complaints(&complaints, category)
        }
        Commands::Counts => {
            let dash = connect(settings)?;
            out.counts(&dash.open_counts().await?)
        }
        Commands::Show {
            report_id,
            threshold,
            all,
        } => {
            if let Some(threshold) = threshold {
                settings.match_threshold = threshold;
            }
            let dash = connect(settings)?;
            let detail = dash.complaint_detail(report_id).await?;
            let ranked = if all {
                Some(dash.ranked_candidates(&detail.complaint).await?)
            } else {
                None
            };
            out.detail(&detail, dash.matcher().threshold(), ranked.as_deref())
        }
        Commands::Status {
            report_id,
            action,
            reason,
        } => {
            let dash = connect(settings)?;
            let session = dash.issue_session(admin);
            let status = dash
                .update_status(&session, report_id, triage_action(action, reason))
                .await?;
            out.status(report_id, &status)
        }
        Commands::Register {
            id,
            lat,
            lon,
            size,
            address,
            owner,
            from,
            to,
            image_url,
            image,
        } => {
            let dash = connect(settings)?;
            let session = dash.issue_session(admin);

            let form = BillboardForm {
                billboard_id: id,
                latitude: lat,
                longitude: lon,
                size,
                address,
                owner,
                validity_from: from,
                validity_to: to,
                image_url: image_url.unwrap_or_default(),
            };

            let billboard = if let Some(path) = image {
                let (name, bytes) = read_image(&path).await?;
                dash.register_billboard_with_image(&session, &form, &name, bytes)
                    .await?
            } else {
                dash.register_billboard(&session, &form).await?
            };
            out.billboard(&billboard)
        }
        Commands::Upload { path, bucket } => {
            if let Some(bucket) = bucket {
                settings.image_bucket = bucket;
            }
            let dash = connect(settings)?;
            let session = dash.issue_session(admin);
            let (name, bytes) = read_image(&path).await?;
            let url = dash.upload_image(&session, &name, bytes).await?;
            out.url(&url)
        }
    }
}
