use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::dtos::agent::CountryRef;
use crate::dtos::country::CountryResponse;
use crate::models::{JobDescription, JobStatus};

#[derive(Debug, Deserialize, Validate)]
pub struct JobDescriptionInput {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub job_name: String,
    #[serde(default)]
    pub job_benefit: Vec<String>,
    #[serde(default)]
    pub job_qualification: Vec<String>,
}

impl From<JobDescriptionInput> for JobDescription {
    fn from(input: JobDescriptionInput) -> Self {
        Self {
            job_name: input.job_name,
            job_benefit: input.job_benefit,
            job_qualification: input.job_qualification,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateJobRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub country: String,
    #[validate(nested)]
    pub job_desc_id: JobDescriptionInput,
    #[validate(nested)]
    pub job_desc_en: JobDescriptionInput,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub salary: f64,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub reg_fee: f64,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJobRequest {
    pub country: Option<String>,
    #[validate(nested)]
    pub job_desc_id: Option<JobDescriptionInput>,
    #[validate(nested)]
    pub job_desc_en: Option<JobDescriptionInput>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub salary: Option<f64>,
    #[validate(range(min = 0.0, message = "must not be negative"))]
    pub reg_fee: Option<f64>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateJobStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct JobFilter {
    #[serde(rename = "countryName")]
    pub country_name: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: String,
    pub country: CountryRef,
    pub job_desc_id: JobDescription,
    pub job_desc_en: JobDescription,
    pub salary: f64,
    pub reg_fee: f64,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One country together with its vacancies, for the grouped listing.
#[derive(Debug, Serialize)]
pub struct CountryJobsResponse {
    #[serde(flatten)]
    pub country: CountryResponse,
    pub jobs: Vec<JobSummary>,
}

#[derive(Debug, Serialize)]
pub struct JobSummary {
    pub id: String,
    pub job_desc_id: JobDescription,
    pub job_desc_en: JobDescription,
    pub salary: f64,
    pub reg_fee: f64,
    pub status: JobStatus,
}
