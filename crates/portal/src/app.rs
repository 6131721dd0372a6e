//! The portal controller: owns the job list, stats snapshot, filters, banners
//! and the open form, and drives the backend in response to user actions.

use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::api::JobBackend;
use crate::filters::{FilterField, FilterOptions, FilterState};
use crate::form::{FormMode, JobForm};
use crate::models::{Job, JobStats};
use crate::views;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Banner {
    message: String,
    expires_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// No form was open.
    NoForm,
    /// Validation failed; nothing was sent.
    Invalid,
    Saved,
    /// The backend rejected the request; the form stays open.
    Failed,
}

pub struct App<B> {
    backend: B,
    jobs: Vec<Job>,
    loading: bool,
    error: Option<String>,
    success: Option<Banner>,
    banner_ttl: Duration,
    filters: FilterState,
    stats: Option<JobStats>,
    form: Option<JobForm>,
}

impl<B: JobBackend> App<B> {
    pub fn new(backend: B, banner_ttl: Duration) -> Self {
        Self {
            backend,
            jobs: Vec::new(),
            loading: true,
            error: None,
            success: None,
            banner_ttl,
            filters: FilterState::default(),
            stats: None,
            form: None,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, id: i64) -> Option<&Job> {
        self.jobs.iter().find(|job| job.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn stats(&self) -> Option<&JobStats> {
        self.stats.as_ref()
    }

    pub fn form(&self) -> Option<&JobForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut JobForm> {
        self.form.as_mut()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success.as_ref().map(|banner| banner.message.as_str())
    }

    /// Initial load: the job list followed by the stats snapshot.
    pub async fn start(&mut self) {
        self.fetch_jobs().await;
        self.fetch_stats().await;
    }

    pub async fn fetch_jobs(&mut self) {
        self.loading = true;
        self.error = None;

        match self.backend.list_jobs(&self.filters).await {
            Ok(jobs) => {
                debug!("Fetched {} jobs", jobs.len());
                self.jobs = jobs;
            }
            Err(e) => {
                error!("Error fetching jobs: {}", e);
                self.error = Some(message_or(&e, "Failed to fetch jobs"));
            }
        }

        self.loading = false;
    }

    // Stats are decorative; a failure is logged and the old snapshot kept.
    pub async fn fetch_stats(&mut self) {
        match self.backend.job_stats().await {
            Ok(stats) => self.stats = Some(stats),
            Err(e) => warn!("Error fetching job stats: {}", e),
        }
    }

    pub async fn set_filters(&mut self, filters: FilterState) {
        self.filters = filters;
        self.fetch_jobs().await;
    }

    pub async fn update_filter(&mut self, field: FilterField, value: &str) -> Result<()> {
        let mut next = self.filters.clone();
        next.set(field, value)?;
        self.set_filters(next).await;
        Ok(())
    }

    pub async fn reset_filters(&mut self) {
        self.set_filters(FilterState::default()).await;
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions::from_stats(self.stats.as_ref())
    }

    pub fn open_create_form(&mut self) {
        self.form = Some(JobForm::new());
    }

    pub fn open_edit_form(&mut self, job: &Job) {
        self.form = Some(JobForm::edit(job));
    }

    /// Opens the edit form for a listed job, asking the backend when the job
    /// is not in the current list.
    pub async fn open_edit_form_by_id(&mut self, id: i64) -> Result<()> {
        let job = match self.job(id) {
            Some(job) => job.clone(),
            None => self.backend.get_job(id).await?,
        };
        self.open_edit_form(&job);
        Ok(())
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
    }

    pub async fn submit_form(&mut self) -> SubmitOutcome {
        let (payload, mode) = {
            let Some(form) = self.form.as_mut() else {
                return SubmitOutcome::NoForm;
            };
            let payload = match form.submission() {
                Ok(payload) => payload,
                Err(e) => {
                    debug!("Form rejected: {}", e);
                    return SubmitOutcome::Invalid;
                }
            };
            form.set_submitting(true);
            (payload, form.mode())
        };

        self.error = None;
        let result = match mode {
            FormMode::Create => self
                .backend
                .create_job(&payload)
                .await
                .map(|job| (job, "Job added successfully!")),
            FormMode::Edit(id) => self
                .backend
                .update_job(id, &payload)
                .await
                .map(|job| (job, "Job updated successfully!")),
        };

        if let Some(form) = self.form.as_mut() {
            form.set_submitting(false);
        }

        match result {
            Ok((saved, message)) => {
                match saved {
                    Some(job) => info!("Saved job {} ({})", job.id, job.title),
                    None => info!("Saved job (no record in response)"),
                }
                self.show_success(message);
                self.form = None;
                self.fetch_jobs().await;
                self.fetch_stats().await;
                SubmitOutcome::Saved
            }
            Err(e) => {
                error!("Error saving job: {}", e);
                self.error = Some(message_or(&e, "Failed to save job"));
                SubmitOutcome::Failed
            }
        }
    }

    /// Deletes a job. Callers confirm with the user first.
    pub async fn delete_job(&mut self, id: i64) -> bool {
        self.error = None;

        match self.backend.delete_job(id).await {
            Ok(()) => {
                info!("Deleted job {}", id);
                self.show_success("Job deleted successfully!");
                self.fetch_jobs().await;
                self.fetch_stats().await;
                true
            }
            Err(e) => {
                error!("Error deleting job {}: {}", id, e);
                self.error = Some(message_or(&e, "Failed to delete job"));
                false
            }
        }
    }

    /// Delete for callers without a job list at hand. Unless `skip_confirm`
    /// is set, the job is looked up so `confirm` can name it; a declined
    /// prompt returns `Ok(false)`.
    pub async fn confirm_and_delete<F>(
        &mut self,
        id: i64,
        skip_confirm: bool,
        confirm: F,
    ) -> Result<bool>
    where
        F: FnOnce(&Job) -> Result<bool>,
    {
        if !skip_confirm {
            let job = match self.job(id) {
                Some(job) => job.clone(),
                None => self.backend.get_job(id).await?,
            };
            if !confirm(&job)? {
                return Ok(false);
            }
        }

        if self.delete_job(id).await {
            Ok(true)
        } else {
            Err(Error::api(
                None,
                self.error.as_deref().unwrap_or("Failed to delete job"),
            ))
        }
    }

    pub fn dismiss_messages(&mut self) {
        self.error = None;
        self.success = None;
    }

    /// Drops the success banner once its time is up.
    pub fn expire_messages(&mut self, now: Instant) {
        if self
            .success
            .as_ref()
            .is_some_and(|banner| banner.expires_at <= now)
        {
            self.success = None;
        }
    }

    fn show_success(&mut self, message: &str) {
        self.success = Some(Banner {
            message: message.to_string(),
            expires_at: Instant::now() + self.banner_ttl,
        });
    }

    pub fn render(&self) -> Result<String> {
        let mut sections = vec![format!("{}\n{}", views::APP_TITLE, views::APP_TAGLINE)];

        if let Some(message) = &self.error {
            sections.push(views::render_error_banner(message));
        }
        if let Some(banner) = &self.success {
            sections.push(views::render_success_banner(&banner.message));
        }

        let mut management = String::from("Job Management  (+ Add New Job: `add`)");
        if let Some(stats) = &self.stats {
            management.push('\n');
            management.push_str(&views::render_stats(stats)?);
        }
        sections.push(management);

        sections.push(views::render_filter_panel(
            &self.filters,
            &self.filter_options(),
        )?);
        sections.push(views::render_job_list(&self.jobs, self.loading)?);

        if let Some(form) = &self.form {
            sections.push(views::render_form(form)?);
        }

        Ok(sections.join("\n\n"))
    }
}

fn message_or(err: &Error, fallback: &str) -> String {
    let message = err.user_message();
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
