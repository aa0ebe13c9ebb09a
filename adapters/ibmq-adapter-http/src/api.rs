//! Provider-scoped REST API.
//!
//! All paths are relative to the project URL
//! `{api}/Hubs/{hub}/Groups/{group}/Projects/{project}`.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use ibmq_account::{
    BackendConfiguration, BackendProperties, BackendStatus, JobInfo, JobPayload, ProviderApi,
    PulseDefaults, TransportError,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::client::ApiClient;
use crate::error::{HttpError, HttpResult};

/// Response of `GET /Backends/{name}/queue/status`.
#[derive(Debug, Deserialize)]
struct QueueStatusResponse {
    /// Whether the backend is operational.
    state: bool,
    /// Status string (e.g. "active").
    #[serde(default)]
    status: String,
    /// Queue length.
    #[serde(default, rename = "lengthQueue")]
    length_queue: u32,
    /// Backend version.
    #[serde(default)]
    backend_version: Option<String>,
}

impl QueueStatusResponse {
    fn into_status(self, backend: &str) -> BackendStatus {
        BackendStatus {
            backend_name: backend.to_string(),
            backend_version: self.backend_version.unwrap_or_default(),
            operational: self.state,
            pending_jobs: self.length_queue,
            status_msg: self.status,
        }
    }
}

/// Job record returned by `POST /Jobs` and `GET /Jobs/{id}/status`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResponse {
    #[serde(default)]
    id: Option<String>,
    status: String,
    #[serde(default)]
    creation_date: Option<DateTime<Utc>>,
    #[serde(default)]
    backend: Option<JobBackend>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct JobBackend {
    name: String,
}

impl JobResponse {
    fn into_info(self, job_id: Option<&str>) -> HttpResult<JobInfo> {
        let id = self
            .id
            .or_else(|| job_id.map(str::to_string))
            .ok_or(HttpError::MissingField("id"))?;
        let error = self.error.map(|e| match e {
            serde_json::Value::String(message) => message,
            other => other
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| other.to_string(), str::to_string),
        });
        Ok(JobInfo {
            id,
            status: self.status,
            backend: self.backend.map(|b| b.name),
            creation_date: self.creation_date,
            error,
        })
    }
}

/// Decode an optional document; the service answers `{}` when there is none.
fn optional<T: DeserializeOwned>(value: serde_json::Value) -> HttpResult<Option<T>> {
    match &value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(map) if map.is_empty() => Ok(None),
        _ => Ok(Some(serde_json::from_value(value)?)),
    }
}

/// Filter selecting the latest properties not newer than `as_of`.
fn properties_filter(as_of: DateTime<Utc>) -> String {
    serde_json::json!({
        "where": {
            "last_update_date": {"lte": as_of.to_rfc3339_opts(SecondsFormat::Secs, true)}
        }
    })
    .to_string()
}

/// [`ProviderApi`] over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpProviderApi {
    client: ApiClient,
    base_url: String,
}

impl HttpProviderApi {
    /// Create an API bound to a project URL.
    pub fn new(client: ApiClient, project_url: &str) -> Self {
        Self {
            client,
            base_url: project_url.trim_end_matches('/').to_string(),
        }
    }

    /// Project URL this API talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn list(&self) -> HttpResult<Vec<BackendConfiguration>> {
        let raw: Vec<serde_json::Value> = self.client.get_json(&self.url("devices/v/1")).await?;

        let mut configs = Vec::with_capacity(raw.len());
        for entry in raw {
            match serde_json::from_value::<BackendConfiguration>(entry) {
                Ok(config) => configs.push(config),
                Err(e) => warn!("skipping backend with invalid configuration: {e}"),
            }
        }
        Ok(configs)
    }

    async fn status(&self, backend: &str) -> HttpResult<BackendStatus> {
        let response: QueueStatusResponse = self
            .client
            .get_json(&self.url(&format!("Backends/{backend}/queue/status")))
            .await?;
        Ok(response.into_status(backend))
    }

    async fn properties(
        &self,
        backend: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> HttpResult<Option<BackendProperties>> {
        let mut query = vec![("version", "1".to_string())];
        if let Some(as_of) = as_of {
            query.push(("filter", properties_filter(as_of)));
        }
        let raw: serde_json::Value = self
            .client
            .get_json_with_query(&self.url(&format!("Backends/{backend}/properties")), &query)
            .await?;
        optional(raw)
    }

    async fn defaults(&self, backend: &str) -> HttpResult<Option<PulseDefaults>> {
        let raw: serde_json::Value = self
            .client
            .get_json(&self.url(&format!("Backends/{backend}/defaults")))
            .await?;
        optional(raw)
    }

    async fn submit(&self, backend: &str, payload: &JobPayload) -> HttpResult<JobInfo> {
        let body = serde_json::json!({
            "qObject": payload,
            "backend": {"name": backend},
        });
        let response: JobResponse = self.client.post_json(&self.url("Jobs"), &body).await?;
        let info = response.into_info(None)?;
        debug!("job {} submitted to {}", info.id, backend);
        Ok(info)
    }

    async fn job(&self, job_id: &str) -> HttpResult<JobInfo> {
        let response: JobResponse = self
            .client
            .get_json(&self.url(&format!("Jobs/{job_id}/status")))
            .await?;
        response.into_info(Some(job_id))
    }

    async fn result(&self, job_id: &str) -> HttpResult<serde_json::Value> {
        let mut job: serde_json::Value = self
            .client
            .get_json(&self.url(&format!("Jobs/{job_id}")))
            .await?;
        job.get_mut("qObjectResult")
            .map(serde_json::Value::take)
            .ok_or(HttpError::MissingField("qObjectResult"))
    }
}

#[async_trait]
impl ProviderApi for HttpProviderApi {
    async fn list_backends(&self) -> Result<Vec<BackendConfiguration>, TransportError> {
        Ok(self.list().await?)
    }

    async fn backend_status(&self, backend: &str) -> Result<BackendStatus, TransportError> {
        Ok(self.status(backend).await?)
    }

    async fn backend_properties(
        &self,
        backend: &str,
        as_of: Option<DateTime<Utc>>,
    ) -> Result<Option<BackendProperties>, TransportError> {
        Ok(self.properties(backend, as_of).await?)
    }

    async fn backend_defaults(
        &self,
        backend: &str,
    ) -> Result<Option<PulseDefaults>, TransportError> {
        Ok(self.defaults(backend).await?)
    }

    async fn submit_job(
        &self,
        backend: &str,
        payload: &JobPayload,
    ) -> Result<JobInfo, TransportError> {
        Ok(self.submit(backend, payload).await?)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobInfo, TransportError> {
        Ok(self.job(job_id).await?)
    }

    async fn job_result(&self, job_id: &str) -> Result<serde_json::Value, TransportError> {
        Ok(self.result(job_id).await?)
    }

    async fn cancel_job(&self, job_id: &str) -> Result<(), TransportError> {
        self.client
            .put(&self.url(&format!("Jobs/{job_id}/cancel")))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ibmq_account::Credential;

    #[test]
    fn test_queue_status_mapping() {
        let response: QueueStatusResponse = serde_json::from_str(
            r#"{"state": true, "status": "active", "lengthQueue": 7, "backend_version": "1.0.0"}"#,
        )
        .unwrap();
        let status = response.into_status("ibmqx2");
        assert_eq!(status.backend_name, "ibmqx2");
        assert!(status.operational);
        assert_eq!(status.pending_jobs, 7);
        assert_eq!(status.status_msg, "active");
        assert_eq!(status.backend_version, "1.0.0");
    }

    #[test]
    fn test_submit_response_mapping() {
        let response: JobResponse = serde_json::from_str(
            r#"{
                "id": "5c8a1b",
                "status": "QUEUED",
                "creationDate": "2019-03-14T10:00:00.000Z",
                "backend": {"name": "ibmqx4", "id": "b1"},
                "kind": "q-object"
            }"#,
        )
        .unwrap();
        let info = response.into_info(None).unwrap();
        assert_eq!(info.id, "5c8a1b");
        assert_eq!(info.backend.as_deref(), Some("ibmqx4"));
        assert!(info.creation_date.is_some());
    }

    #[test]
    fn test_status_response_uses_requested_id() {
        let response: JobResponse = serde_json::from_str(
            r#"{"status": "ERROR_RUNNING_JOB", "error": {"code": 1234, "message": "bad qobj"}}"#,
        )
        .unwrap();
        let info = response.into_info(Some("job-1")).unwrap();
        assert_eq!(info.id, "job-1");
        assert_eq!(info.error.as_deref(), Some("bad qobj"));
    }

    #[test]
    fn test_missing_job_id() {
        let response: JobResponse = serde_json::from_str(r#"{"status": "QUEUED"}"#).unwrap();
        assert!(matches!(
            response.into_info(None),
            Err(HttpError::MissingField("id"))
        ));
    }

    #[test]
    fn test_empty_document_is_none() {
        assert!(
            optional::<PulseDefaults>(serde_json::json!({}))
                .unwrap()
                .is_none()
        );
        assert!(
            optional::<PulseDefaults>(serde_json::Value::Null)
                .unwrap()
                .is_none()
        );
        let defaults = optional::<PulseDefaults>(serde_json::json!({"qubit_freq_est": [4.9]}))
            .unwrap()
            .unwrap();
        assert_eq!(defaults.qubit_freq_est, vec![4.9]);
    }

    #[test]
    fn test_properties_filter() {
        let as_of = Utc.with_ymd_and_hms(2019, 2, 1, 0, 0, 0).unwrap();
        let filter: serde_json::Value = serde_json::from_str(&properties_filter(as_of)).unwrap();
        assert_eq!(
            filter["where"]["last_update_date"]["lte"],
            "2019-02-01T00:00:00Z"
        );
    }

    #[test]
    fn test_base_url_normalized() {
        let client = ApiClient::new(&Credential::production("t"), None).unwrap();
        let api = HttpProviderApi::new(
            client,
            "https://api.example.com/api/Hubs/h/Groups/g/Projects/p/",
        );
        assert_eq!(
            api.url("devices/v/1"),
            "https://api.example.com/api/Hubs/h/Groups/g/Projects/p/devices/v/1"
        );
    }
}
