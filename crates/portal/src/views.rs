//! Text renderings of the portal's screens: job cards, the delete prompt,
//! stats, banners, the filter panel, the job list and the add/edit form.

use serde_json::json;

use crate::filters::{FilterOptions, FilterState};
use crate::form::{FormField, JobForm};
use crate::models::{parse_date, Job, JobStats};
use crate::template::render_template;
use crate::Result;

pub const APP_TITLE: &str = "Job Listing Portal";
pub const APP_TAGLINE: &str = "Find your next actuarial opportunity";

const JOB_CARD: &str = r#"#{{ id }} {{ title }}
   {{ company }}
   📍 {{ location }}
   [{{ job_type }}]  Posted: {{ posted }}
{%- if tags %}
   Tags: {% for tag in tags %}#{{ tag }}{% if not loop.last %} {% endif %}{% endfor %}
{%- endif %}
{%- if description %}
   {{ description }}
{%- endif %}
{%- if url %}
   View original: {{ url }}
{%- endif %}"#;

const STATS: &str = r#"Total Jobs: {{ total_jobs }}
{%- if job_types %}
{% for entry in job_types %}{{ entry.name }}: {{ entry.count }}{% if not loop.last %} | {% endif %}{% endfor %}
{%- endif %}"#;

const FILTER_PANEL: &str = r#"Filter & Sort Jobs
  Search:   {{ search }}
  Job Type: {{ job_type }}
  Location: {{ location }}
  Tags:     {{ tag }}
  Sort By:  {{ sort }}
{%- if chips %}
Active Filters: {% for chip in chips %}[{{ chip.label }}]{% if not loop.last %} {% endif %}{% endfor %}
{%- endif %}
{%- if locations %}
Known locations: {{ locations | join(sep=", ") }}
{%- endif %}
{%- if tags %}
Known tags: {{ tags | join(sep=", ") }}
{%- endif %}"#;

const JOB_FORM: &str = r#"{{ heading }}
{% for field in fields %}
  {{ field.label }}{% if field.required %} *{% endif %}: {{ field.value }}
{%- if field.error %}
    ! {{ field.error }}
{%- endif %}
{%- endfor %}
[{{ submit_label }}]  [Cancel]"#;

/// `Jan 5, 2024`, or a placeholder when the backend sent nothing usable.
pub fn format_posting_date(raw: Option<&str>) -> String {
    raw.and_then(parse_date)
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "Date not available".to_string())
}

pub fn render_job_card(job: &Job) -> Result<String> {
    let context = json!({
        "id": job.id,
        "title": job.title,
        "company": job.company,
        "location": job.location,
        "job_type": job.job_type_or_default().as_str(),
        "posted": format_posting_date(job.posting_date.as_deref()),
        "tags": job.tags,
        "description": job.description.as_deref().unwrap_or(""),
        "url": job.url.as_deref().unwrap_or(""),
    });
    render_template("job_card", JOB_CARD, &context)
}

pub fn delete_prompt(job: &Job) -> String {
    format!(
        "Are you sure you want to delete the job \"{}\" at {}?",
        job.title, job.company
    )
}

pub fn render_stats(stats: &JobStats) -> Result<String> {
    let job_types: Vec<_> = stats
        .job_types
        .iter()
        .map(|(name, count)| json!({ "name": name, "count": count }))
        .collect();
    let context = json!({
        "total_jobs": stats.total_jobs,
        "job_types": job_types,
    });
    render_template("stats", STATS, &context)
}

pub fn render_filter_panel(filters: &FilterState, options: &FilterOptions) -> Result<String> {
    let context = json!({
        "search": filters.search,
        "job_type": filters
            .job_type
            .map(|t| t.as_str())
            .unwrap_or("All Job Types"),
        "location": filters.location,
        "tag": filters.tag,
        "sort": filters.sort.label(),
        "chips": filters.active_filters(),
        "locations": options.locations,
        "tags": options.tags,
    });
    render_template("filter_panel", FILTER_PANEL, &context)
}

pub fn render_result_count(count: usize) -> String {
    format!("Showing {} job{}", count, if count == 1 { "" } else { "s" })
}

pub fn render_job_list(jobs: &[Job], loading: bool) -> Result<String> {
    let mut sections = vec![render_result_count(jobs.len())];

    if loading {
        sections.push("Loading jobs...".to_string());
    } else if jobs.is_empty() {
        sections.push(
            "No jobs found\nTry adjusting your filters or add a new job to get started."
                .to_string(),
        );
    } else {
        for job in jobs {
            sections.push(render_job_card(job)?);
        }
    }

    Ok(sections.join("\n\n"))
}

pub fn render_error_banner(message: &str) -> String {
    format!("[error] {} (dismiss to clear)", message)
}

pub fn render_success_banner(message: &str) -> String {
    format!("[ok] {}", message)
}

pub fn render_form(form: &JobForm) -> Result<String> {
    let fields: Vec<_> = FormField::ALL
        .iter()
        .map(|field| {
            json!({
                "label": field.label(),
                "required": field.is_required(),
                "value": form.value(*field),
                "error": form.error(*field).unwrap_or(""),
            })
        })
        .collect();
    let context = json!({
        "heading": form.heading(),
        "fields": fields,
        "submit_label": form.submit_label(),
    });
    render_template("job_form", JOB_FORM, &context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterField;
    use crate::models::JobType;
    use std::collections::BTreeMap;

    fn job() -> Job {
        Job {
            id: 12,
            title: "Pricing Actuary".into(),
            company: "ABC Insurance".into(),
            location: "Hartford, CT".into(),
            job_type: None,
            tags: vec!["Pricing".into(), "SQL".into()],
            description: Some("Build rating plans.".into()),
            url: Some("https://example.com/jobs/12".into()),
            posting_date: Some("2024-03-09T08:30:00".into()),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn card_shows_every_section() {
        let card = render_job_card(&job()).unwrap();
        assert_eq!(
            card,
            "#12 Pricing Actuary\n   ABC Insurance\n   📍 Hartford, CT\n   \
             [Full-time]  Posted: Mar 9, 2024\n   Tags: #Pricing #SQL\n   \
             Build rating plans.\n   View original: https://example.com/jobs/12"
        );
    }

    #[test]
    fn card_omits_empty_sections() {
        let mut bare = job();
        bare.tags.clear();
        bare.description = None;
        bare.url = None;
        bare.posting_date = Some("sometime".into());
        bare.job_type = Some(JobType::Internship);
        let card = render_job_card(&bare).unwrap();
        assert!(card.ends_with("[Internship]  Posted: Date not available"));
        assert!(!card.contains("Tags:"));
        assert!(!card.contains("View original"));
    }

    #[test]
    fn delete_prompt_names_job_and_company() {
        assert_eq!(
            delete_prompt(&job()),
            "Are you sure you want to delete the job \"Pricing Actuary\" at ABC Insurance?"
        );
    }

    #[test]
    fn stats_list_counts_per_type() {
        let mut job_types = BTreeMap::new();
        job_types.insert("Contract".to_string(), 1);
        job_types.insert("Full-time".to_string(), 4);
        let stats = JobStats {
            total_jobs: 5,
            job_types,
            ..Default::default()
        };
        assert_eq!(
            render_stats(&stats).unwrap(),
            "Total Jobs: 5\nContract: 1 | Full-time: 4"
        );
        assert_eq!(render_stats(&JobStats::default()).unwrap(), "Total Jobs: 0");
    }

    #[test]
    fn result_count_pluralises() {
        assert_eq!(render_result_count(0), "Showing 0 jobs");
        assert_eq!(render_result_count(1), "Showing 1 job");
        assert_eq!(render_result_count(2), "Showing 2 jobs");
    }

    #[test]
    fn list_states() {
        assert!(render_job_list(&[], true).unwrap().contains("Loading jobs..."));
        assert!(render_job_list(&[], false).unwrap().contains("No jobs found"));
        let list = render_job_list(&[job()], false).unwrap();
        assert!(list.starts_with("Showing 1 job\n\n#12 Pricing Actuary"));
    }

    #[test]
    fn filter_panel_shows_chips_and_suggestions() {
        let mut filters = FilterState::new();
        filters.set(FilterField::Tag, "Pricing").unwrap();
        filters.set(FilterField::Sort, "title_asc").unwrap();
        let options = FilterOptions {
            locations: vec!["Remote".into(), "Chicago, IL".into()],
            tags: vec![],
        };
        let panel = render_filter_panel(&filters, &options).unwrap();
        assert!(panel.contains("Job Type: All Job Types"));
        assert!(panel.contains("Sort By:  Job Title: A-Z"));
        assert!(panel.contains("Active Filters: [Tag: Pricing]"));
        assert!(panel.contains("Known locations: Remote, Chicago, IL"));
        assert!(!panel.contains("Known tags"));
    }

    #[test]
    fn filter_panel_without_filters_has_no_chips() {
        let panel = render_filter_panel(&FilterState::new(), &FilterOptions::default()).unwrap();
        assert!(!panel.contains("Active Filters"));
    }

    #[test]
    fn form_marks_required_fields_and_errors() {
        let mut form = JobForm::new();
        form.validate();
        let rendered = render_form(&form).unwrap();
        assert!(rendered.starts_with("Add New Job\n"));
        assert!(rendered.contains("  Job Title *: \n    ! Job title is required"));
        assert!(rendered.contains("  Job Type: Full-time"));
        assert!(rendered.ends_with("[Add Job]  [Cancel]"));
    }
}
