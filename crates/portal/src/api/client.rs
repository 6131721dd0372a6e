use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::JobBackend;
use crate::config::ApiConfig;
use crate::filters::FilterState;
use crate::metrics;
use crate::models::{ApiEnvelope, Job, JobPayload, JobStats};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListJobs,
    GetJob,
    CreateJob,
    UpdateJob,
    DeleteJob,
    JobStats,
    Health,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ListJobs => "list_jobs",
            Operation::GetJob => "get_job",
            Operation::CreateJob => "create_job",
            Operation::UpdateJob => "update_job",
            Operation::DeleteJob => "delete_job",
            Operation::JobStats => "job_stats",
            Operation::Health => "health",
        }
    }

    /// Shown when the server gives no usable message.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Operation::ListJobs => "Failed to fetch jobs",
            Operation::GetJob => "Failed to fetch job",
            Operation::CreateJob => "Failed to create job",
            Operation::UpdateJob => "Failed to update job",
            Operation::DeleteJob => "Failed to delete job",
            Operation::JobStats => "Failed to fetch job statistics",
            Operation::Health => "API health check failed",
        }
    }

    fn uses_server_message(&self) -> bool {
        !matches!(self, Operation::Health)
    }
}

/// reqwest-backed client for the job REST API.
#[derive(Clone)]
pub struct JobApiClient {
    base_url: String,
    client: Client,
}

impl JobApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder().default_headers(headers);
        if config.timeout_secs > 0 {
            builder = builder.timeout(config.timeout());
        }

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Performs the request and returns the raw body of a 2xx response.
    /// Failures are logged, counted and turned into `Error::Api`.
    async fn execute(
        &self,
        op: Operation,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&JobPayload>,
    ) -> Result<(StatusCode, String)> {
        info!("Making {} request to {}", method, path);

        let mut request = self.client.request(method, format!("{}{}", self.base_url, path));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("API Error ({}): {}", op.name(), e);
                metrics::record_request(op.name(), false);
                return Err(Error::api(None, op.fallback_message()));
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                error!("API Error ({}): failed to read body: {}", op.name(), e);
                metrics::record_request(op.name(), false);
                return Err(Error::api(Some(status.as_u16()), op.fallback_message()));
            }
        };
        debug!(
            "{} {} -> {} in {}ms",
            op.name(),
            path,
            status,
            started.elapsed().as_millis()
        );

        if !status.is_success() {
            error!("API Error ({}): {} {}", op.name(), status, text);
            metrics::record_request(op.name(), false);
            let message = if op.uses_server_message() {
                server_message(&text)
            } else {
                None
            };
            return Err(Error::api(
                Some(status.as_u16()),
                message.unwrap_or_else(|| op.fallback_message().to_string()),
            ));
        }

        Ok((status, text))
    }

    async fn send<T: DeserializeOwned>(
        &self,
        op: Operation,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&JobPayload>,
    ) -> Result<T> {
        let (status, text) = self.execute(op, method, path, query, body).await?;

        // 204s and empty bodies decode as JSON null
        let body = if text.trim().is_empty() { "null" } else { text.as_str() };
        match serde_json::from_str::<T>(body) {
            Ok(decoded) => {
                metrics::record_request(op.name(), true);
                Ok(decoded)
            }
            Err(e) => {
                error!("API Error ({}): undecodable response: {}", op.name(), e);
                metrics::record_request(op.name(), false);
                Err(Error::api(Some(status.as_u16()), op.fallback_message()))
            }
        }
    }

    /// Create and update: the backend has already applied the change once it
    /// answers 2xx, so the echoed job is optional.
    async fn send_mutation(
        &self,
        op: Operation,
        method: Method,
        path: &str,
        payload: &JobPayload,
    ) -> Result<Option<Job>> {
        let (_, text) = self.execute(op, method, path, &[], Some(payload)).await?;
        metrics::record_request(op.name(), true);
        Ok(saved_job(op, &text))
    }
}

fn saved_job(op: Operation, body: &str) -> Option<Job> {
    let data = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()?
        .data?;
    match serde_json::from_value(data) {
        Ok(job) => Some(job),
        Err(e) => {
            warn!("{} succeeded but returned an unreadable job: {}", op.name(), e);
            None
        }
    }
}

/// Pulls a non-blank `message` out of an error body, if there is one.
fn server_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiEnvelope<serde_json::Value>>(body)
        .ok()
        .and_then(|envelope| envelope.message)
        .filter(|message| !message.trim().is_empty())
}

#[async_trait]
impl JobBackend for JobApiClient {
    async fn list_jobs(&self, filters: &FilterState) -> Result<Vec<Job>> {
        let envelope: ApiEnvelope<Vec<Job>> = self
            .send(
                Operation::ListJobs,
                Method::GET,
                "/jobs",
                &filters.query_params(),
                None,
            )
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn get_job(&self, id: i64) -> Result<Job> {
        let envelope: ApiEnvelope<Job> = self
            .send(
                Operation::GetJob,
                Method::GET,
                &format!("/jobs/{}", id),
                &[],
                None,
            )
            .await?;
        envelope
            .data
            .ok_or_else(|| Error::api(None, Operation::GetJob.fallback_message()))
    }

    async fn create_job(&self, payload: &JobPayload) -> Result<Option<Job>> {
        self.send_mutation(Operation::CreateJob, Method::POST, "/jobs", payload)
            .await
    }

    async fn update_job(&self, id: i64, payload: &JobPayload) -> Result<Option<Job>> {
        self.send_mutation(
            Operation::UpdateJob,
            Method::PUT,
            &format!("/jobs/{}", id),
            payload,
        )
        .await
    }

    async fn delete_job(&self, id: i64) -> Result<()> {
        let _: serde_json::Value = self
            .send(
                Operation::DeleteJob,
                Method::DELETE,
                &format!("/jobs/{}", id),
                &[],
                None,
            )
            .await?;
        Ok(())
    }

    async fn job_stats(&self) -> Result<JobStats> {
        let envelope: ApiEnvelope<JobStats> = self
            .send(Operation::JobStats, Method::GET, "/jobs/stats", &[], None)
            .await?;
        Ok(envelope.data.unwrap_or_default())
    }

    async fn health(&self) -> Result<serde_json::Value> {
        self.send(Operation::Health, Method::GET, "/health", &[], None)
            .await
    }
}
