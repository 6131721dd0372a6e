//! Filter and sort state for the job list.
//!
//! The state maps one-to-one onto the query string of `GET /jobs`: every
//! non-empty field becomes a parameter, everything else is left out.

use crate::models::{JobStats, JobType};
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    PostingDateDesc,
    PostingDateAsc,
    TitleAsc,
    TitleDesc,
    CompanyAsc,
    CompanyDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        SortOrder::PostingDateDesc,
        SortOrder::PostingDateAsc,
        SortOrder::TitleAsc,
        SortOrder::TitleDesc,
        SortOrder::CompanyAsc,
        SortOrder::CompanyDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::PostingDateDesc => "posting_date_desc",
            SortOrder::PostingDateAsc => "posting_date_asc",
            SortOrder::TitleAsc => "title_asc",
            SortOrder::TitleDesc => "title_desc",
            SortOrder::CompanyAsc => "company_asc",
            SortOrder::CompanyDesc => "company_desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::PostingDateDesc => "Date Posted: Newest First",
            SortOrder::PostingDateAsc => "Date Posted: Oldest First",
            SortOrder::TitleAsc => "Job Title: A-Z",
            SortOrder::TitleDesc => "Job Title: Z-A",
            SortOrder::CompanyAsc => "Company: A-Z",
            SortOrder::CompanyDesc => "Company: Z-A",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        SortOrder::ALL
            .iter()
            .copied()
            .find(|order| order.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                Error::Validation(format!(
                    "Unknown sort '{}' (expected one of: {})",
                    wanted,
                    SortOrder::ALL
                        .iter()
                        .map(|o| o.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Search,
    JobType,
    Location,
    Tag,
    Sort,
}

impl FilterField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterField::Search => "search",
            FilterField::JobType => "job_type",
            FilterField::Location => "location",
            FilterField::Tag => "tag",
            FilterField::Sort => "sort",
        }
    }
}

impl FromStr for FilterField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "search" => Ok(FilterField::Search),
            "job_type" | "type" => Ok(FilterField::JobType),
            "location" => Ok(FilterField::Location),
            "tag" | "tags" => Ok(FilterField::Tag),
            "sort" => Ok(FilterField::Sort),
            other => Err(Error::Validation(format!("Unknown filter '{}'", other))),
        }
    }
}

/// One entry in the "Active Filters" strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterChip {
    pub field: &'static str,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search: String,
    pub job_type: Option<JobType>,
    pub location: String,
    pub tag: String,
    pub sort: SortOrder,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates one field from user input. An empty job type means "all types".
    pub fn set(&mut self, field: FilterField, value: &str) -> Result<()> {
        match field {
            FilterField::Search => self.search = value.to_string(),
            FilterField::Location => self.location = value.to_string(),
            FilterField::Tag => self.tag = value.to_string(),
            FilterField::JobType => {
                let value = value.trim();
                self.job_type = if value.is_empty() || value.eq_ignore_ascii_case("all") {
                    None
                } else {
                    Some(value.parse()?)
                };
            }
            FilterField::Sort => self.sort = value.parse()?,
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.search.is_empty() {
            params.push((FilterField::Search.as_str(), self.search.clone()));
        }
        if let Some(job_type) = self.job_type {
            params.push((FilterField::JobType.as_str(), job_type.as_str().to_string()));
        }
        if !self.location.is_empty() {
            params.push((FilterField::Location.as_str(), self.location.clone()));
        }
        if !self.tag.is_empty() {
            params.push((FilterField::Tag.as_str(), self.tag.clone()));
        }
        params.push((FilterField::Sort.as_str(), self.sort.as_str().to_string()));
        params
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search.is_empty()
            || self.job_type.is_some()
            || !self.location.is_empty()
            || !self.tag.is_empty()
    }

    pub fn active_filters(&self) -> Vec<FilterChip> {
        let mut chips = Vec::new();
        if !self.search.is_empty() {
            chips.push(FilterChip {
                field: "search",
                label: format!("Search: \"{}\"", self.search),
            });
        }
        if let Some(job_type) = self.job_type {
            chips.push(FilterChip {
                field: "job_type",
                label: format!("Type: {}", job_type),
            });
        }
        if !self.location.is_empty() {
            chips.push(FilterChip {
                field: "location",
                label: format!("Location: {}", self.location),
            });
        }
        if !self.tag.is_empty() {
            chips.push(FilterChip {
                field: "tag",
                label: format!("Tag: {}", self.tag),
            });
        }
        chips
    }
}

/// Suggestions for the location and tag inputs, taken from the stats snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub locations: Vec<String>,
    pub tags: Vec<String>,
}

impl FilterOptions {
    pub fn from_stats(stats: Option<&JobStats>) -> Self {
        let Some(stats) = stats else {
            return Self::default();
        };
        Self {
            locations: stats.locations.clone().unwrap_or_default(),
            tags: stats.tags.clone().unwrap_or_default(),
        }
    }
}
