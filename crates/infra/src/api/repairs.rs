//! Repairs feature client
//!
//! Endpoint map for the `/repairs` resource. List/search and every mutating
//! call consult the connectivity monitor first and fail fast with
//! [`ApiError::Offline`] instead of letting a request time out against a
//! dead link.

use std::sync::Arc;

use repairhub_core::connectivity::ConnectivityMonitor;
use repairhub_domain::{Repair, RepairHistoryEntry, RepairPhoto, RepairStatus};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::form_urlencoded;

use super::client::ApiClient;
use super::errors::ApiError;

/// Query parameters for the repairs list endpoint.
#[derive(Debug, Clone, Default)]
pub struct RepairFilter {
    pub status: Option<RepairStatus>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl RepairFilter {
    #[must_use]
    pub fn status(mut self, status: RepairStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    #[must_use]
    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as a query string, empty when no parameter is set.
    #[must_use]
    pub fn query_string(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if let Some(status) = self.status {
            query.append_pair("status", status.as_str());
        }
        if let Some(search) = &self.search {
            query.append_pair("search", search);
        }
        if let Some(page) = self.page {
            query.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            query.append_pair("limit", &limit.to_string());
        }

        let rendered = query.finish();
        if rendered.is_empty() {
            rendered
        } else {
            format!("?{rendered}")
        }
    }
}

/// Acknowledgement returned by the create endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRepair {
    pub id: i64,
    #[serde(default)]
    pub message: Option<String>,
}

/// One photo to attach to a repair via the multipart upload.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

#[derive(Serialize)]
struct StatusPatch<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextNumber {
    next_number: String,
}

/// Client for the `/repairs` resource.
pub struct RepairsApi {
    client: Arc<ApiClient>,
    connectivity: Arc<ConnectivityMonitor>,
}

impl RepairsApi {
    pub fn new(client: Arc<ApiClient>, connectivity: Arc<ConnectivityMonitor>) -> Self {
        Self { client, connectivity }
    }

    /// List repairs matching the filter.
    pub async fn list(&self, filter: &RepairFilter) -> Result<Vec<Repair>, ApiError> {
        self.ensure_online().await?;
        let path = format!("/repairs{}", filter.query_string());
        debug!(%path, "listing repairs");
        self.client.get(&path).await
    }

    /// Fetch a single repair by id.
    pub async fn get(&self, id: i64) -> Result<Repair, ApiError> {
        self.client.get(&format!("/repairs/{id}")).await
    }

    /// Create a repair record.
    pub async fn create(&self, repair: &Repair) -> Result<CreatedRepair, ApiError> {
        self.ensure_online().await?;
        self.client.post("/repairs", repair).await
    }

    /// Replace a repair record.
    pub async fn update(&self, id: i64, repair: &Repair) -> Result<(), ApiError> {
        self.ensure_online().await?;
        self.client.put::<serde_json::Value, _>(&format!("/repairs/{id}"), repair).await?;
        Ok(())
    }

    /// Delete a repair record.
    pub async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.ensure_online().await?;
        self.client.delete::<serde_json::Value>(&format!("/repairs/{id}")).await?;
        Ok(())
    }

    /// Patch only the workflow status (and optional notes).
    pub async fn update_status(
        &self,
        id: i64,
        status: RepairStatus,
        notes: Option<&str>,
    ) -> Result<(), ApiError> {
        self.ensure_online().await?;
        let patch = StatusPatch { status: status.as_str(), notes };
        self.client.patch::<serde_json::Value, _>(&format!("/repairs/{id}/status"), &patch).await?;
        Ok(())
    }

    /// Upload photos for a repair. Returns the persisted photo records.
    pub async fn upload_photos(
        &self,
        id: i64,
        photos: &[PhotoUpload],
    ) -> Result<Vec<RepairPhoto>, ApiError> {
        self.ensure_online().await?;

        let path = format!("/repairs/{id}/photos");
        self.client
            .post_multipart(&path, || {
                let mut form = reqwest::multipart::Form::new();
                for photo in photos {
                    let part = reqwest::multipart::Part::bytes(photo.bytes.clone())
                        .file_name(photo.file_name.clone());
                    let part = match part.mime_str("image/jpeg") {
                        Ok(part) => part,
                        Err(_) => reqwest::multipart::Part::bytes(photo.bytes.clone())
                            .file_name(photo.file_name.clone()),
                    };
                    form = form.part("photos", part);
                    if let Some(caption) = &photo.caption {
                        form = form.text("captions", caption.clone());
                    }
                }
                form
            })
            .await
    }

    /// Remove one photo from a repair.
    pub async fn delete_photo(&self, repair_id: i64, photo_id: i64) -> Result<(), ApiError> {
        self.ensure_online().await?;
        self.client
            .delete::<serde_json::Value>(&format!("/repairs/{repair_id}/photos/{photo_id}"))
            .await?;
        Ok(())
    }

    /// Status-change audit trail for a repair.
    pub async fn history(&self, id: i64) -> Result<Vec<RepairHistoryEntry>, ApiError> {
        self.client.get(&format!("/repairs/{id}/history")).await
    }

    /// The number the backend will assign to the next intake.
    pub async fn next_repair_number(&self) -> Result<String, ApiError> {
        let next: NextNumber = self.client.get("/repairs/next-number").await?;
        Ok(next.next_number)
    }

    async fn ensure_online(&self) -> Result<(), ApiError> {
        if self.connectivity.allows_mutations().await {
            Ok(())
        } else {
            debug!("offline, refusing repairs call");
            Err(ApiError::Offline)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering as AtomicOrdering;
    use std::time::Duration;

    use async_trait::async_trait;
    use repairhub_core::connectivity::ConnectivityProbe;
    use repairhub_domain::Result as DomainResult;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::super::client::ApiClientConfig;
    use super::super::session::test_support::StaticSession;
    use super::*;

    struct AlwaysFast;

    #[async_trait]
    impl ConnectivityProbe for AlwaysFast {
        async fn measure_latency(&self) -> DomainResult<Duration> {
            Ok(Duration::from_millis(10))
        }
    }

    fn api(server: &MockServer) -> (RepairsApi, Arc<ConnectivityMonitor>, Arc<StaticSession>) {
        let session = Arc::new(StaticSession::with_token("T1"));
        let client = Arc::new(
            ApiClient::new(
                ApiClientConfig {
                    base_url: format!("{}/api", server.uri()),
                    ..Default::default()
                },
                session.clone(),
            )
            .unwrap(),
        );
        let monitor = Arc::new(ConnectivityMonitor::new(Arc::new(AlwaysFast)));
        (RepairsApi::new(client, monitor.clone()), monitor, session)
    }

    fn sample_repair_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "device_type": "phone",
            "brand": "Apple",
            "model": "iPhone 12",
            "client_name": "Anna",
            "client_phone": "+79990000000",
            "issue_description": "cracked screen",
            "repair_status": "pending"
        })
    }

    #[test]
    fn filter_renders_query_string() {
        let filter = RepairFilter::default()
            .status(RepairStatus::InProgress)
            .search("iphone")
            .page(2)
            .limit(20);
        assert_eq!(filter.query_string(), "?status=in_progress&search=iphone&page=2&limit=20");

        assert_eq!(RepairFilter::default().query_string(), "");
    }

    #[tokio::test]
    async fn list_passes_filter_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/repairs"))
            .and(query_param("status", "pending"))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": true, "data": [sample_repair_json(1)]}),
            ))
            .mount(&server)
            .await;

        let (repairs, _, _) = api(&server);
        let filter = RepairFilter::default().status(RepairStatus::Pending).limit(10);
        let records = repairs.list(&filter).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, Some(1));
    }

    #[tokio::test]
    async fn status_patch_sends_wire_status_and_notes() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/repairs/7/status"))
            .and(body_json(json!({"status": "waiting_parts", "notes": "ordered screen"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": true, "data": {"message": "updated"}}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let (repairs, _, _) = api(&server);
        repairs.update_status(7, RepairStatus::WaitingParts, Some("ordered screen")).await.unwrap();
    }

    #[tokio::test]
    async fn create_returns_assigned_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/repairs"))
            .respond_with(ResponseTemplate::new(201).set_body_json(
                json!({"success": true, "data": {"id": 99, "message": "created"}}),
            ))
            .mount(&server)
            .await;

        let (repairs, _, _) = api(&server);
        let repair = Repair::intake("laptop", "Lenovo", "T480", "Ivan", "+700", "no boot");
        let created = repairs.create(&repair).await.unwrap();
        assert_eq!(created.id, 99);
    }

    #[tokio::test]
    async fn offline_gates_list_and_mutations_without_traffic() {
        let server = MockServer::start().await;
        // No mocks mounted: any request would 404 and fail the test below
        // differently than Offline.

        let (repairs, monitor, session) = api(&server);
        monitor.set_offline().await;

        let err = repairs.list(&RepairFilter::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::Offline));

        let repair = Repair::intake("laptop", "Lenovo", "T480", "Ivan", "+700", "no boot");
        assert!(matches!(repairs.create(&repair).await.unwrap_err(), ApiError::Offline));
        assert!(matches!(repairs.delete(1).await.unwrap_err(), ApiError::Offline));
        assert!(matches!(
            repairs.update_status(1, RepairStatus::Completed, None).await.unwrap_err(),
            ApiError::Offline
        ));

        assert_eq!(server.received_requests().await.unwrap().len(), 0);
        assert_eq!(session.refresh_calls.load(AtomicOrdering::SeqCst), 0);
    }

    #[tokio::test]
    async fn history_and_next_number_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/repairs/4/history"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [{
                    "id": 1,
                    "repair_id": 4,
                    "repair_status": "completed",
                    "changed_by": "tech1",
                    "created_at": "2024-06-01T12:00:00Z"
                }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/repairs/next-number"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": true, "data": {"nextNumber": "R-2024-0102"}}),
            ))
            .mount(&server)
            .await;

        let (repairs, _, _) = api(&server);

        let history = repairs.history(4).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].repair_status, RepairStatus::Completed);

        assert_eq!(repairs.next_repair_number().await.unwrap(), "R-2024-0102");
    }
}
