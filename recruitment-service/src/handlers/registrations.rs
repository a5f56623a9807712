use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use futures::future::try_join_all;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::FindOptions;
use service_core::error::AppError;
use std::collections::HashMap;
use validator::ValidateEmail;

use crate::dtos::agent::validate_phone;
use crate::dtos::registration::{RegistrationFilter, RegistrationResponse};
use crate::dtos::PagedResponse;
use crate::models::{Registration, StoredAsset};
use crate::services::provisioning::parse_object_id;
use crate::services::storage::AssetKind;
use crate::utils::multipart::{missing_fields, FormData, UploadedFile};
use crate::utils::query::{month_year_filter, select_fields, ListParams};
use crate::AppState;

const REQUIRED_TEXTS: [&str; 7] = [
    "name",
    "phone",
    "email",
    "destination",
    "job_type",
    "info_source",
    "social_media",
];
const REQUIRED_FILES: [&str; 4] = ["cv", "dossier", "id_photo", "full_photo"];
const OPTIONAL_FILES: [&str; 2] = ["passport", "police_certificate"];
const PHOTO_FIELDS: [&str; 2] = ["id_photo", "full_photo"];

/// POST /api/registrations: applicant intake. Every missing required field is
/// reported in a single response rather than one at a time.
pub async fn create_registration(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let mut form = FormData::read(multipart, state.config.upload.max_size_bytes()).await?;

    let missing = missing_fields(&form, &REQUIRED_TEXTS, &REQUIRED_FILES);
    if !missing.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let email = form.text("email").unwrap_or_default().to_lowercase();
    if !email.validate_email() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "email must be a valid email address"
        )));
    }
    let phone = form.text("phone").unwrap_or_default().to_string();
    if validate_phone(&phone).is_err() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "phone must be 10 to 15 digits"
        )));
    }

    for field in PHOTO_FIELDS {
        if let Some(file) = form.file(field) {
            if !file.is_image() {
                return Err(AppError::BadRequest(anyhow::anyhow!(
                    "{} must be an image, got {}",
                    field,
                    file.content_type
                )));
            }
        }
    }

    let mut uploads: Vec<(&'static str, UploadedFile, AssetKind)> = Vec::new();
    for field in REQUIRED_FILES {
        let file = form.take_file(field).ok_or_else(|| {
            AppError::BadRequest(anyhow::anyhow!("Missing required fields: {field}"))
        })?;
        let kind = if PHOTO_FIELDS.contains(&field) {
            AssetKind::Image
        } else {
            AssetKind::Document
        };
        uploads.push((field, file, kind));
    }
    for field in OPTIONAL_FILES {
        if let Some(file) = form.take_file(field) {
            uploads.push((field, file, AssetKind::Document));
        }
    }

    // All documents go up concurrently; one failure fails the registration.
    let uploaded = try_join_all(uploads.iter().map(|(_, file, kind)| {
        state.storage.upload(file.data.clone(), &file.filename, *kind)
    }))
    .await?;

    let mut assets: HashMap<&str, StoredAsset> = uploads
        .iter()
        .zip(uploaded)
        .map(|((field, _, _), asset)| {
            (
                *field,
                StoredAsset {
                    url: asset.url,
                    public_id: Some(asset.public_id),
                },
            )
        })
        .collect();

    let now = Utc::now();
    let registration = Registration {
        id: ObjectId::new(),
        name: form.text("name").unwrap_or_default().to_string(),
        phone,
        email,
        destination: form.text("destination").unwrap_or_default().to_string(),
        job_type: form.text("job_type").unwrap_or_default().to_string(),
        info_source: form.text("info_source").unwrap_or_default().to_string(),
        social_media: form.text("social_media").unwrap_or_default().to_string(),
        cv: take_asset(&mut assets, "cv")?,
        dossier: take_asset(&mut assets, "dossier")?,
        passport: assets.remove("passport"),
        police_certificate: assets.remove("police_certificate"),
        id_photo: take_asset(&mut assets, "id_photo")?,
        full_photo: take_asset(&mut assets, "full_photo")?,
        created_at: now,
        updated_at: now,
    };

    state.db.registrations().insert_one(&registration, None).await?;
    tracing::info!(registration = %registration.id.to_hex(), "Registration submitted");

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse::from(registration)),
    ))
}

pub async fn list_registrations(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<RegistrationFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = Document::new();
    if let Some(name) = filter.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        query.insert("name", doc! { "$regex": name, "$options": "i" });
    }
    if let Some(range) = month_year_filter(filter.month, filter.year)? {
        query.extend(range);
    }

    let total = state
        .db
        .registrations()
        .count_documents(query.clone(), None)
        .await?;

    let options = FindOptions::builder()
        .sort(params.sort_doc(doc! { "created_at": -1 }))
        .skip(params.skip())
        .limit(params.limit() as i64)
        .build();

    let registrations: Vec<Registration> = state
        .db
        .registrations()
        .find(query, options)
        .await?
        .try_collect()
        .await?;

    let data: Vec<serde_json::Value> = registrations
        .into_iter()
        .map(|r| serde_json::to_value(RegistrationResponse::from(r)))
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::InternalError(e.into()))?;

    Ok(Json(PagedResponse::new(
        select_fields(data, &params),
        total,
        params.page(),
        params.limit(),
    )))
}

pub async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration_id = parse_object_id(&id).map_err(AppError::from)?;
    let registration = state
        .db
        .registrations()
        .find_one(doc! { "_id": registration_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Registration not found")))?;
    Ok(Json(RegistrationResponse::from(registration)))
}

fn take_asset(
    assets: &mut HashMap<&str, StoredAsset>,
    field: &str,
) -> Result<StoredAsset, AppError> {
    assets
        .remove(field)
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("upload result missing for {field}")))
}
