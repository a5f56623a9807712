use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Open,
    Closed,
    Pending,
}

impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Pending
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescription {
    pub job_name: String,
    #[serde(default)]
    pub job_benefit: Vec<String>,
    #[serde(default)]
    pub job_qualification: Vec<String>,
}

/// Vacancy advertised for a country, described in both languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobVacancy {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub country: ObjectId,
    pub job_desc_id: JobDescription,
    pub job_desc_en: JobDescription,
    pub salary: f64,
    pub reg_fee: f64,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl JobVacancy {
    pub fn new(
        country: ObjectId,
        job_desc_id: JobDescription,
        job_desc_en: JobDescription,
        salary: f64,
        reg_fee: f64,
        status: JobStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            country,
            job_desc_id,
            job_desc_en,
            salary,
            reg_fee,
            status,
            created_at: now,
            updated_at: now,
        }
    }
}
