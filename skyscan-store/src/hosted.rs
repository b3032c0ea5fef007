use anyhow::anyhow;
use log::{debug, info};
use reqwest::{
    Client, Method, RequestBuilder, Url,
    header::{AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};

use skyscan_logic::{Billboard, Complaint, ComplaintStatus, DataStore, ReportId, prelude::*};

use crate::config::StoreConfig;

const REST_PATH: &str = "/rest/v1";
const STORAGE_PATH: &str = "/storage/v1/object";

const BILLBOARDS_PATH: &str = const_str::concat!(REST_PATH, "/billboards");
const REPORTS_PATH: &str = const_str::concat!(REST_PATH, "/reports");
const PUBLIC_OBJECT_PATH: &str = const_str::concat!(STORAGE_PATH, "/public");

const JSON: &str = "application/json";
const IMAGE_CACHE_CONTROL: &str = "max-age=3600";

/// [DataStore] backed by the hosted database's REST API and its object storage
pub struct HostedStore {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct StatusPatch<'a> {
    status: &'a ComplaintStatus,
    action_taken: &'a str,
}

/// Guess an image's MIME type from its name, storage serves it back with this type
pub fn content_type_for(object_name: &str) -> &'static str {
    let ext = object_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

impl HostedStore {
    pub fn new(config: StoreConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key).context("API key is not a valid header")?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .context("API key is not a valid header")?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url,
        })
    }

    fn table_url(&self, path: &str, filters: &[(&str, String)]) -> Result<Url> {
        let endpoint = format!("{}{path}", self.base_url);
        let url = if filters.is_empty() {
            Url::parse(&endpoint)
        } else {
            Url::parse_with_params(&endpoint, filters)
        };
        url.context("Invalid backend URL")
    }

    fn object_url(&self, bucket: &str, object_name: &str) -> String {
        format!("{}{STORAGE_PATH}/{bucket}/{object_name}", self.base_url)
    }

    fn public_url(&self, bucket: &str, object_name: &str) -> String {
        format!("{}{PUBLIC_OBJECT_PATH}/{bucket}/{object_name}", self.base_url)
    }

    fn eq(column: &'static str, value: impl ToString) -> (&'static str, String) {
        (column, format!("eq.{}", value.to_string()))
    }

    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response> {
        req.send()
            .await
            .context("Could not send request")?
            .error_for_status()
            .context("Backend returned error")
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, url: Url) -> Result<Vec<T>> {
        debug!("GET {url}");
        let body = self
            .send(self.client.get(url))
            .await?
            .bytes()
            .await
            .context("Failed to read response")?;
        serde_json::from_slice(&body).context("Failed to parse rows")
    }

    async fn write_rows(&self, method: Method, url: Url, body: &impl Serialize) -> Result {
        debug!("{method} {url}");
        let body = serde_json::to_vec(body).context("Failed to serialize rows")?;
        let req = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header("Prefer", "return=minimal")
            .body(body);
        self.send(req).await?;
        Ok(())
    }
}

impl DataStore for HostedStore {
    async fn list_billboards(&self) -> Result<Vec<Billboard>> {
        let url = self.table_url(BILLBOARDS_PATH, &[("select", "*".to_string())])?;
        self.fetch_rows(url).await
    }

    async fn billboard_exists(&self, id: &str) -> Result<bool> {
        let url = self.table_url(
            BILLBOARDS_PATH,
            &[("select", "id".to_string()), Self::eq("id", id)],
        )?;
        let rows = self.fetch_rows::<serde_json::Value>(url).await?;
        Ok(!rows.is_empty())
    }

    async fn insert_billboard(&self, billboard: &Billboard) -> Result {
        let url = self.table_url(BILLBOARDS_PATH, &[])?;
        self.write_rows(Method::POST, url, &[billboard]).await?;
        info!("Inserted billboard {}", billboard.id);
        Ok(())
    }

    async fn list_complaints(&self) -> Result<Vec<Complaint>> {
        let url = self.table_url(REPORTS_PATH, &[("select", "*".to_string())])?;
        self.fetch_rows(url).await
    }

    async fn get_complaint(&self, report_id: ReportId) -> Result<Option<Complaint>> {
        let url = self.table_url(
            REPORTS_PATH,
            &[("select", "*".to_string()), Self::eq("report_id", report_id)],
        )?;
        let rows = self.fetch_rows::<Complaint>(url).await?;
        Ok(rows.into_iter().next())
    }

    async fn update_complaint_status(
        &self,
        report_id: ReportId,
        status: &ComplaintStatus,
        action_taken: &str,
    ) -> Result {
        let url = self.table_url(REPORTS_PATH, &[Self::eq("report_id", report_id)])?;
        let patch = StatusPatch {
            status,
            action_taken,
        };
        self.write_rows(Method::PATCH, url, &patch).await
    }

    async fn upload_image(&self, bucket: &str, object_name: &str, bytes: Vec<u8>) -> Result<String> {
        if object_name.contains('/') {
            return Err(anyhow!("Object name {object_name} must not contain a path"));
        }

        let url = self.object_url(bucket, object_name);
        debug!("POST {url} ({} bytes)", bytes.len());

        let req = self
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type_for(object_name))
            .header(CACHE_CONTROL, IMAGE_CACHE_CONTROL)
            .header("x-upsert", "false")
            .body(bytes);
        self.send(req).await.context("Image upload failed")?;

        Ok(self.public_url(bucket, object_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_store() -> HostedStore {
        HostedStore::new(StoreConfig::new("https://backend.example.com/", "anon-key"))
            .expect("Failed to build store")
    }

    #[test]
    fn test_table_urls() {
        let store = mk_store();

        let url = store
            .table_url(
                BILLBOARDS_PATH,
                &[("select", "id".to_string()), HostedStore::eq("id", "BB 1&2")],
            )
            .unwrap();
        assert_eq!(url.path(), "/rest/v1/billboards");
        let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();
        assert_eq!(
            pairs,
            vec![
                ("select".to_string(), "id".to_string()),
                ("id".to_string(), "eq.BB 1&2".to_string())
            ]
        );

        let url = store
            .table_url(REPORTS_PATH, &[HostedStore::eq("report_id", 42)])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://backend.example.com/rest/v1/reports?report_id=eq.42"
        );

        let url = store.table_url(BILLBOARDS_PATH, &[]).unwrap();
        assert_eq!(url.as_str(), "https://backend.example.com/rest/v1/billboards");
    }

    #[test]
    fn test_storage_urls() {
        let store = mk_store();
        assert_eq!(
            store.object_url("adminbillboard", "1-abc.png"),
            "https://backend.example.com/storage/v1/object/adminbillboard/1-abc.png"
        );
        assert_eq!(
            store.public_url("adminbillboard", "1-abc.png"),
            "https://backend.example.com/storage/v1/object/public/adminbillboard/1-abc.png"
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("a.png"), "image/png");
        assert_eq!(content_type_for("a.webp"), "image/webp");
        assert_eq!(content_type_for("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }

    #[test]
    fn test_status_patch_body() {
        let status = ComplaintStatus::Rejected;
        let patch = StatusPatch {
            status: &status,
            action_taken: "Duplicate complaint",
        };
        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "status": "Rejected", "action_taken": "Duplicate complaint" })
        );
    }

    #[test]
    fn test_parse_rows() {
        let raw = r#"[{
            "report_id": 7,
            "image_url": "https://example.com/7.jpg",
            "gps_latitude": 19.076,
            "gps_longitude": 72.8777,
            "timestamp": "2025-06-01T10:30:00+00:00",
            "status": "under review",
            "issue": "Frame is rusting through",
            "user_id": "u-19",
            "report_type": "Hazardous",
            "action_taken": null
        }]"#;
        let rows = serde_json::from_str::<Vec<Complaint>>(raw).expect("Failed to parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ComplaintStatus::UnderReview);
        assert!(rows[0].timestamp.is_some());
        assert_eq!(rows[0].action_taken, None);

        let raw = r#"[{
            "id": "BB-1",
            "address": "Marine Drive",
            "owner": "Skyline Media",
            "status": "active",
            "image_url": "https://example.com/bb-1.jpg",
            "validity_from": "2025-01-01",
            "validity_till": "2026-01-01",
            "size": "40x20 ft",
            "latitude": 19.076,
            "longitude": 72.8777
        }]"#;
        let rows = serde_json::from_str::<Vec<Billboard>>(raw).expect("Failed to parse");
        assert_eq!(rows[0].id, "BB-1");
        assert_eq!(rows[0].latitude, 19.076);
    }

    #[test]
    fn test_parse_loose_rows() {
        let raw = r#"[
            {
                "report_id": 8,
                "image_url": "https://example.com/8.jpg",
                "gps_latitude": 19.076,
                "gps_longitude": 72.8777,
                "status": null,
                "issue": "No permit number shown",
                "user_id": "u-20",
                "report_type": "Illegal"
            },
            {
                "report_id": 9,
                "image_url": "https://example.com/9.jpg",
                "gps_latitude": 19.076,
                "gps_longitude": 72.8777,
                "status": "Under Review",
                "issue": "Blocks the signal",
                "user_id": "u-21",
                "report_type": "Illegal"
            }
        ]"#;
        let rows = serde_json::from_str::<Vec<Complaint>>(raw).expect("Null status rejected");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].status, ComplaintStatus::Other(String::new()));
        assert_eq!(rows[0].timestamp, None);
        assert_eq!(rows[1].status, ComplaintStatus::UnderReview);

        let counts = skyscan_logic::open_counts(&rows);
        assert_eq!(counts[1].open, 1);

        let raw = r#"[{
            "id": "BB-2",
            "address": "Linking Road",
            "owner": "Skyline Media",
            "status": "active",
            "image_url": "https://example.com/bb-2.jpg",
            "validity_from": "2025-01-01",
            "validity_till": "2026-01-01",
            "size": "20x10 ft",
            "gps_latitude": 19.06,
            "gps_longitude": 72.83
        }]"#;
        let rows = serde_json::from_str::<Vec<Billboard>>(raw).expect("Failed to parse");
        assert_eq!(rows[0].latitude, 19.06);
        assert_eq!(rows[0].longitude, 72.83);
    }

    #[test]
    fn test_billboard_row_body() {
        let raw = r#"{
            "id": "BB-3",
            "address": "Carter Road",
            "owner": "Skyline Media",
            "status": "active",
            "image_url": "https://example.com/bb-3.jpg",
            "validity_from": "2025-01-01",
            "validity_till": "2026-01-01",
            "size": "20x10 ft",
            "latitude": 19.07,
            "longitude": 72.82
        }"#;
        let billboard = serde_json::from_str::<Billboard>(raw).expect("Failed to parse");
        let body = serde_json::to_value(&billboard).unwrap();
        assert_eq!(body["latitude"], 19.07);
        assert_eq!(body["longitude"], 72.82);
        assert!(body.get("gps_latitude").is_none());
    }
}
