mod client;

pub use client::{JobApiClient, Operation};

use async_trait::async_trait;

use crate::filters::FilterState;
use crate::models::{Job, JobPayload, JobStats};
use crate::Result;

/// The REST backend as the controller sees it. Every failure comes back as
/// `Error::Api` carrying the message to show the user. Create and update
/// succeed on any 2xx; the saved job is returned when the body carries one.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobBackend: Send + Sync {
    async fn list_jobs(&self, filters: &FilterState) -> Result<Vec<Job>>;
    async fn get_job(&self, id: i64) -> Result<Job>;
    async fn create_job(&self, payload: &JobPayload) -> Result<Option<Job>>;
    async fn update_job(&self, id: i64, payload: &JobPayload) -> Result<Option<Job>>;
    async fn delete_job(&self, id: i64) -> Result<()>;
    async fn job_stats(&self) -> Result<JobStats>;
    async fn health(&self) -> Result<serde_json::Value>;
}
