use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, to_bson, DateTime as BsonDateTime, Document};
use mongodb::options::FindOptions;
use service_core::error::AppError;
use std::collections::HashMap;

use crate::dtos::agent::CountryRef;
use crate::dtos::country::CountryResponse;
use crate::dtos::job::{
    CountryJobsResponse, CreateJobRequest, JobFilter, JobResponse, JobSummary,
    UpdateJobRequest, UpdateJobStatusRequest,
};
use crate::dtos::{MessageResponse, PagedResponse};
use crate::models::{Country, JobStatus, JobVacancy};
use crate::services::provisioning::parse_object_id;
use crate::utils::query::{select_fields, ListParams};
use crate::utils::validation::ValidatedJson;
use crate::AppState;

pub async fn create_job(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    let country_id = parse_object_id(&req.country).map_err(AppError::from)?;
    let country = state
        .db
        .countries()
        .find_one(doc! { "_id": country_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Country not found")))?;

    let status = match req.status.as_deref() {
        Some(raw) => parse_status(raw)?,
        None => JobStatus::default(),
    };

    // The same position may exist in different countries, but not twice in
    // the same one.
    if state
        .db
        .job_vacancies()
        .find_one(
            doc! { "country": country_id, "job_desc_en.job_name": &req.job_desc_en.job_name },
            None,
        )
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "This job already exists for the country"
        )));
    }

    let job = JobVacancy::new(
        country_id,
        req.job_desc_id.into(),
        req.job_desc_en.into(),
        req.salary,
        req.reg_fee,
        status,
    );

    state.db.job_vacancies().insert_one(&job, None).await?;
    tracing::info!(job = %job.id.to_hex(), country = %country.name_id, "Job vacancy created");

    Ok((StatusCode::CREATED, Json(to_response(job, &country))))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<JobFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = Document::new();

    if let Some(status) = filter.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        parse_status(status)?;
        query.insert("status", status.to_lowercase());
    }

    if let Some(name) = filter.country_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        let countries: Vec<Country> = state
            .db
            .countries()
            .find(
                doc! { "$or": [
                    { "name_id": { "$regex": name, "$options": "i" } },
                    { "name_en": { "$regex": name, "$options": "i" } },
                ]},
                None,
            )
            .await?
            .try_collect()
            .await?;
        let ids: Vec<ObjectId> = countries.iter().map(|c| c.id).collect();
        if ids.is_empty() {
            return Ok(Json(PagedResponse::<serde_json::Value>::new(
                Vec::new(),
                0,
                params.page(),
                params.limit(),
            )));
        }
        query.insert("country", doc! { "$in": ids });
    }

    let total = state.db.job_vacancies().count_documents(query.clone(), None).await?;

    let options = FindOptions::builder()
        .sort(params.sort_doc(doc! { "created_at": -1 }))
        .skip(params.skip())
        .limit(params.limit() as i64)
        .build();

    let jobs: Vec<JobVacancy> = state
        .db
        .job_vacancies()
        .find(query, options)
        .await?
        .try_collect()
        .await?;

    let countries = load_countries(&state, jobs.iter().map(|j| j.country)).await?;

    let data: Vec<serde_json::Value> = jobs
        .into_iter()
        .filter_map(|job| countries.get(&job.country).map(|c| to_response(job, c)))
        .map(serde_json::to_value)
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::InternalError(e.into()))?;

    Ok(Json(PagedResponse::new(
        select_fields(data, &params),
        total,
        params.page(),
        params.limit(),
    )))
}

/// GET /api/jobcountries: every country with its vacancies grouped under it,
/// including countries that have none yet.
pub async fn list_job_countries(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let countries: Vec<Country> = state
        .db
        .countries()
        .find(None, FindOptions::builder().sort(doc! { "name_id": 1 }).build())
        .await?
        .try_collect()
        .await?;

    let jobs: Vec<JobVacancy> = state
        .db
        .job_vacancies()
        .find(None, None)
        .await?
        .try_collect()
        .await?;

    let mut grouped: HashMap<ObjectId, Vec<JobSummary>> = HashMap::new();
    for job in jobs {
        grouped.entry(job.country).or_default().push(JobSummary {
            id: job.id.to_hex(),
            job_desc_id: job.job_desc_id,
            job_desc_en: job.job_desc_en,
            salary: job.salary,
            reg_fee: job.reg_fee,
            status: job.status,
        });
    }

    let data: Vec<CountryJobsResponse> = countries
        .into_iter()
        .map(|country| {
            let jobs = grouped.remove(&country.id).unwrap_or_default();
            CountryJobsResponse {
                country: CountryResponse::from(country),
                jobs,
            }
        })
        .collect();

    Ok(Json(data))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job_id = parse_object_id(&id).map_err(AppError::from)?;
    let job = state
        .db
        .job_vacancies()
        .find_one(doc! { "_id": job_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Job vacancy not found")))?;

    let country = state
        .db
        .countries()
        .find_one(doc! { "_id": job.country }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Country not found")))?;

    Ok(Json(to_response(job, &country)))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateJobRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job_id = parse_object_id(&id).map_err(AppError::from)?;
    let mut update = doc! { "updated_at": BsonDateTime::now() };

    if let Some(country) = req.country.as_deref() {
        let country_id = parse_object_id(country).map_err(AppError::from)?;
        state
            .db
            .countries()
            .find_one(doc! { "_id": country_id }, None)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Country not found")))?;
        update.insert("country", country_id);
    }

    if let Some(desc) = req.job_desc_id {
        let desc: crate::models::JobDescription = desc.into();
        update.insert(
            "job_desc_id",
            to_bson(&desc).map_err(|e| AppError::InternalError(e.into()))?,
        );
    }
    if let Some(desc) = req.job_desc_en {
        let desc: crate::models::JobDescription = desc.into();
        update.insert(
            "job_desc_en",
            to_bson(&desc).map_err(|e| AppError::InternalError(e.into()))?,
        );
    }
    if let Some(salary) = req.salary {
        update.insert("salary", salary);
    }
    if let Some(reg_fee) = req.reg_fee {
        update.insert("reg_fee", reg_fee);
    }
    if let Some(status) = req.status.as_deref() {
        parse_status(status)?;
        update.insert("status", status.to_lowercase());
    }

    let result = state
        .db
        .job_vacancies()
        .update_one(doc! { "_id": job_id }, doc! { "$set": update }, None)
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Job vacancy not found")));
    }

    let job = state
        .db
        .job_vacancies()
        .find_one(doc! { "_id": job_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Job vacancy not found")))?;
    let country = state
        .db
        .countries()
        .find_one(doc! { "_id": job.country }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Country not found")))?;
    Ok(Json(to_response(job, &country)))
}

/// PATCH /api/jobs/:id/status: only transitions to `open` or `closed` are
/// allowed here; `pending` is the intake state, not a destination.
pub async fn update_job_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateJobStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let job_id = parse_object_id(&id).map_err(AppError::from)?;
    let status = req.status.trim().to_lowercase();
    if status != "open" && status != "closed" {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Status must be either open or closed"
        )));
    }

    let result = state
        .db
        .job_vacancies()
        .update_one(
            doc! { "_id": job_id },
            doc! { "$set": { "status": &status, "updated_at": BsonDateTime::now() } },
            None,
        )
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Job vacancy not found")));
    }
    Ok(Json(MessageResponse::new("Job status updated")))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job_id = parse_object_id(&id).map_err(AppError::from)?;
    let result = state
        .db
        .job_vacancies()
        .delete_one(doc! { "_id": job_id }, None)
        .await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Job vacancy not found")));
    }
    Ok(Json(MessageResponse::new("Job vacancy deleted successfully")))
}

fn parse_status(raw: &str) -> Result<JobStatus, AppError> {
    match raw.trim().to_lowercase().as_str() {
        "open" => Ok(JobStatus::Open),
        "closed" => Ok(JobStatus::Closed),
        "pending" => Ok(JobStatus::Pending),
        other => Err(AppError::BadRequest(anyhow::anyhow!(
            "Invalid job status: {other}"
        ))),
    }
}

async fn load_countries(
    state: &AppState,
    ids: impl Iterator<Item = ObjectId>,
) -> Result<HashMap<ObjectId, Country>, AppError> {
    let ids: Vec<ObjectId> = ids.collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let countries: Vec<Country> = state
        .db
        .countries()
        .find(doc! { "_id": { "$in": ids } }, None)
        .await?
        .try_collect()
        .await?;
    Ok(countries.into_iter().map(|c| (c.id, c)).collect())
}

fn to_response(job: JobVacancy, country: &Country) -> JobResponse {
    JobResponse {
        id: job.id.to_hex(),
        country: CountryRef {
            id: country.id.to_hex(),
            name_id: country.name_id.clone(),
            name_en: country.name_en.clone(),
        },
        job_desc_id: job.job_desc_id,
        job_desc_en: job.job_desc_en,
        salary: job.salary,
        reg_fee: job.reg_fee,
        status: job.status,
        created_at: job.created_at,
        updated_at: job.updated_at,
    }
}
