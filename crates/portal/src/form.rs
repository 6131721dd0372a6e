//! Add/edit form state and submit-time validation.

use crate::models::{Job, JobPayload, JobType};
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    Title,
    Company,
    Location,
    JobType,
    Tags,
    Description,
    Url,
}

impl FormField {
    /// Fields in the order the form presents them.
    pub const ALL: [FormField; 7] = [
        FormField::Title,
        FormField::Company,
        FormField::Location,
        FormField::JobType,
        FormField::Tags,
        FormField::Description,
        FormField::Url,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Company => "company",
            FormField::Location => "location",
            FormField::JobType => "job_type",
            FormField::Tags => "tags",
            FormField::Description => "description",
            FormField::Url => "url",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Job Title",
            FormField::Company => "Company",
            FormField::Location => "Location",
            FormField::JobType => "Job Type",
            FormField::Tags => "Tags",
            FormField::Description => "Description",
            FormField::Url => "Job URL",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FormField::Title => "e.g. Senior Actuary",
            FormField::Company => "e.g. ABC Insurance Company",
            FormField::Location => "e.g. New York, NY or Remote",
            FormField::JobType => "Full-time, Part-time, Contract, Internship, Temporary",
            FormField::Tags => "e.g. Life Insurance, Pricing, Python (comma-separated)",
            FormField::Description => "Job description...",
            FormField::Url => "https://example.com/job-posting",
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, FormField::Title | FormField::Company | FormField::Location)
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FormField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        FormField::ALL
            .iter()
            .copied()
            .find(|field| field.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::Validation(format!("Unknown form field '{}'", wanted)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobForm {
    mode: FormMode,
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: JobType,
    pub tags: String,
    pub description: String,
    pub url: String,
    errors: BTreeMap<FormField, String>,
    submitting: bool,
}

impl Default for JobForm {
    fn default() -> Self {
        Self::new()
    }
}

impl JobForm {
    pub fn new() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            company: String::new(),
            location: String::new(),
            job_type: JobType::FullTime,
            tags: String::new(),
            description: String::new(),
            url: String::new(),
            errors: BTreeMap::new(),
            submitting: false,
        }
    }

    pub fn edit(job: &Job) -> Self {
        Self {
            mode: FormMode::Edit(job.id),
            title: job.title.clone(),
            company: job.company.clone(),
            location: job.location.clone(),
            job_type: job.job_type_or_default(),
            tags: job.tags.join(", "),
            description: job.description.clone().unwrap_or_default(),
            url: job.url.clone().unwrap_or_default(),
            errors: BTreeMap::new(),
            submitting: false,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, FormMode::Edit(_))
    }

    pub fn heading(&self) -> &'static str {
        if self.is_editing() {
            "Edit Job"
        } else {
            "Add New Job"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match (self.submitting, self.is_editing()) {
            (true, _) => "Saving...",
            (false, true) => "Update Job",
            (false, false) => "Add Job",
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn set_submitting(&mut self, submitting: bool) {
        self.submitting = submitting;
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::Title => self.title.clone(),
            FormField::Company => self.company.clone(),
            FormField::Location => self.location.clone(),
            FormField::JobType => self.job_type.as_str().to_string(),
            FormField::Tags => self.tags.clone(),
            FormField::Description => self.description.clone(),
            FormField::Url => self.url.clone(),
        }
    }

    /// Stores user input. Typing into a field clears that field's error.
    pub fn set(&mut self, field: FormField, value: &str) -> Result<()> {
        match field {
            FormField::Title => self.title = value.to_string(),
            FormField::Company => self.company = value.to_string(),
            FormField::Location => self.location = value.to_string(),
            FormField::JobType => self.job_type = value.parse()?,
            FormField::Tags => self.tags = value.to_string(),
            FormField::Description => self.description = value.to_string(),
            FormField::Url => self.url = value.to_string(),
        }
        self.errors.remove(&field);
        Ok(())
    }

    pub fn errors(&self) -> &BTreeMap<FormField, String> {
        &self.errors
    }

    pub fn error(&self, field: FormField) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Re-runs every check and replaces the error set. Returns true when clean.
    pub fn validate(&mut self) -> bool {
        let mut errors = BTreeMap::new();

        if self.title.trim().is_empty() {
            errors.insert(FormField::Title, "Job title is required".to_string());
        }
        if self.company.trim().is_empty() {
            errors.insert(FormField::Company, "Company name is required".to_string());
        }
        if self.location.trim().is_empty() {
            errors.insert(FormField::Location, "Location is required".to_string());
        }
        if !self.url.is_empty() && !is_valid_url(&self.url) {
            errors.insert(FormField::Url, "Please enter a valid URL".to_string());
        }

        self.errors = errors;
        self.errors.is_empty()
    }

    pub fn payload(&self) -> JobPayload {
        JobPayload {
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            job_type: self.job_type,
            tags: self.tags.trim().to_string(),
            description: self.description.clone(),
            url: self.url.clone(),
        }
    }

    /// Validates and hands back the body to send, or a validation error
    /// listing every failing field.
    pub fn submission(&mut self) -> Result<JobPayload> {
        if self.validate() {
            Ok(self.payload())
        } else {
            Err(Error::Validation(
                self.errors.values().cloned().collect::<Vec<_>>().join("; "),
            ))
        }
    }
}

pub fn is_valid_url(candidate: &str) -> bool {
    url::Url::parse(candidate).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job() -> Job {
        Job {
            id: 7,
            title: "Senior Actuary".into(),
            company: "ABC Insurance".into(),
            location: "Remote".into(),
            job_type: Some(JobType::Contract),
            tags: vec!["Pricing".into(), "Python".into()],
            description: Some("Own the pricing models".into()),
            url: None,
            posting_date: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn empty_form_reports_required_fields() {
        let mut form = JobForm::new();
        assert!(!form.validate());
        assert_eq!(form.error(FormField::Title), Some("Job title is required"));
        assert_eq!(form.error(FormField::Company), Some("Company name is required"));
        assert_eq!(form.error(FormField::Location), Some("Location is required"));
        assert_eq!(form.error(FormField::Url), None);
        assert!(form.submission().is_err());
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut form = JobForm::new();
        form.set(FormField::Title, "   ").unwrap();
        form.set(FormField::Company, "ABC").unwrap();
        form.set(FormField::Location, "Remote").unwrap();
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn malformed_url_is_rejected() {
        let mut form = JobForm::new();
        form.set(FormField::Title, "Actuary").unwrap();
        form.set(FormField::Company, "ABC").unwrap();
        form.set(FormField::Location, "Remote").unwrap();
        form.set(FormField::Url, "www.example.com/job").unwrap();
        assert!(!form.validate());
        assert_eq!(form.error(FormField::Url), Some("Please enter a valid URL"));

        form.set(FormField::Url, "https://www.example.com/job").unwrap();
        assert!(form.validate());
    }

    #[test]
    fn typing_clears_the_field_error() {
        let mut form = JobForm::new();
        form.validate();
        form.set(FormField::Title, "A").unwrap();
        assert_eq!(form.error(FormField::Title), None);
        assert!(form.error(FormField::Company).is_some());
    }

    #[test]
    fn edit_prefills_from_job() {
        let form = JobForm::edit(&sample_job());
        assert_eq!(form.mode(), FormMode::Edit(7));
        assert_eq!(form.tags, "Pricing, Python");
        assert_eq!(form.job_type, JobType::Contract);
        assert_eq!(form.description, "Own the pricing models");
        assert_eq!(form.url, "");
        assert_eq!(form.heading(), "Edit Job");
        assert_eq!(form.submit_label(), "Update Job");
    }

    #[test]
    fn labels_follow_mode_and_submitting() {
        let mut form = JobForm::new();
        assert_eq!(form.heading(), "Add New Job");
        assert_eq!(form.submit_label(), "Add Job");
        form.set_submitting(true);
        assert_eq!(form.submit_label(), "Saving...");
    }

    #[test]
    fn payload_trims_tags_only() {
        let mut form = JobForm::new();
        form.set(FormField::Title, " Actuary ").unwrap();
        form.set(FormField::Company, "ABC").unwrap();
        form.set(FormField::Location, "Remote").unwrap();
        form.set(FormField::Tags, "  Life, Pricing  ").unwrap();
        let payload = form.submission().unwrap();
        assert_eq!(payload.tags, "Life, Pricing");
        assert_eq!(payload.title, " Actuary ");
        assert_eq!(payload.job_type, JobType::FullTime);
    }

    #[test]
    fn job_type_must_be_known() {
        let mut form = JobForm::new();
        assert!(form.set(FormField::JobType, "Gig").is_err());
        form.set(FormField::JobType, "temporary").unwrap();
        assert_eq!(form.job_type, JobType::Temporary);
    }
}
