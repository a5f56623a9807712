use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime, Document};
use mongodb::options::FindOptions;
use service_core::error::AppError;

use crate::dtos::country::{CountryFilter, CountryResponse};
use crate::dtos::{MessageResponse, PagedResponse};
use crate::models::{Country, StoredAsset};
use crate::services::provisioning::parse_object_id;
use crate::services::storage::AssetKind;
use crate::utils::multipart::{missing_fields, FormData};
use crate::utils::query::{select_fields, ListParams};
use crate::AppState;

/// POST /api/countries: multipart form with bilingual names, description
/// paragraphs (repeated `desc_id`/`desc_en` fields) and a country image.
pub async fn create_country(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FormData::read(multipart, state.config.upload.max_size_bytes()).await?;

    let missing = missing_fields(&form, &["name_id", "name_en"], &["img"]);
    if !missing.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let img = form.file("img").ok_or_else(|| {
        AppError::BadRequest(anyhow::anyhow!("Missing required fields: img"))
    })?;
    if !img.is_image() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "img must be an image, got {}",
            img.content_type
        )));
    }

    let name_id = form.text("name_id").unwrap_or_default().to_lowercase();
    if state
        .db
        .countries()
        .find_one(doc! { "name_id": &name_id }, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow::anyhow!("Country already exists")));
    }

    let asset = state
        .storage
        .upload(img.data.clone(), &img.filename, AssetKind::Image)
        .await?;

    let country = Country::new(
        name_id,
        form.text("name_en").unwrap_or_default().to_string(),
        form.text_values("desc_id"),
        form.text_values("desc_en"),
        StoredAsset {
            url: asset.url,
            public_id: Some(asset.public_id.clone()),
        },
    );

    if let Err(e) = state.db.countries().insert_one(&country, None).await {
        // Orphaned uploads are worse than a failed cleanup attempt.
        if let Err(del) = state.storage.delete(&asset.public_id).await {
            tracing::warn!(public_id = %asset.public_id, error = %del, "Failed to clean up asset after insert error");
        }
        return Err(AppError::from(e));
    }

    tracing::info!(country = %country.name_id, "Country created");
    Ok((StatusCode::CREATED, Json(CountryResponse::from(country))))
}

pub async fn list_countries(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<CountryFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = Document::new();
    if let Some(name) = filter.country_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        query.insert(
            "$or",
            vec![
                doc! { "name_id": { "$regex": name, "$options": "i" } },
                doc! { "name_en": { "$regex": name, "$options": "i" } },
            ],
        );
    }

    let total = state.db.countries().count_documents(query.clone(), None).await?;

    let options = FindOptions::builder()
        .sort(params.sort_doc(doc! { "name_id": 1 }))
        .skip(params.skip())
        .limit(params.limit() as i64)
        .build();

    let countries: Vec<Country> = state
        .db
        .countries()
        .find(query, options)
        .await?
        .try_collect()
        .await?;

    let data: Vec<serde_json::Value> = countries
        .into_iter()
        .map(|c| serde_json::to_value(CountryResponse::from(c)))
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::InternalError(e.into()))?;

    Ok(Json(PagedResponse::new(
        select_fields(data, &params),
        total,
        params.page(),
        params.limit(),
    )))
}

pub async fn get_country(
    State(state): State<AppState>,
    Path(id_or_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let country = find_country(&state, &id_or_name).await?;
    Ok(Json(CountryResponse::from(country)))
}

/// PUT /api/countries/:id: multipart form; any provided field replaces the
/// stored one, and a new image replaces (and deletes) the old asset.
pub async fn update_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let country_id = parse_object_id(&id).map_err(AppError::from)?;
    let existing = state
        .db
        .countries()
        .find_one(doc! { "_id": country_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Country not found")))?;

    let form = FormData::read(multipart, state.config.upload.max_size_bytes()).await?;
    let mut update = doc! { "updated_at": BsonDateTime::now() };

    if let Some(name_id) = form.text("name_id") {
        let name_id = name_id.to_lowercase();
        if state
            .db
            .countries()
            .find_one(doc! { "name_id": &name_id, "_id": { "$ne": country_id } }, None)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(anyhow::anyhow!("Country already exists")));
        }
        update.insert("name_id", name_id);
    }
    if let Some(name_en) = form.text("name_en") {
        update.insert("name_en", name_en.to_lowercase());
    }
    if !form.text_values("desc_id").is_empty() {
        update.insert("desc_id", form.text_values("desc_id"));
    }
    if !form.text_values("desc_en").is_empty() {
        update.insert("desc_en", form.text_values("desc_en"));
    }

    let mut old_public_id = None;
    if let Some(img) = form.file("img") {
        if !img.is_image() {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "img must be an image, got {}",
                img.content_type
            )));
        }
        let asset = state
            .storage
            .upload(img.data.clone(), &img.filename, AssetKind::Image)
            .await?;
        update.insert(
            "img",
            doc! { "url": &asset.url, "public_id": &asset.public_id },
        );
        old_public_id = existing.img.public_id.clone();
    }

    state
        .db
        .countries()
        .update_one(doc! { "_id": country_id }, doc! { "$set": update }, None)
        .await?;

    if let Some(public_id) = old_public_id {
        if let Err(e) = state.storage.delete(&public_id).await {
            tracing::warn!(public_id = %public_id, error = %e, "Failed to delete replaced country image");
        }
    }

    let country = state
        .db
        .countries()
        .find_one(doc! { "_id": country_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Country not found")))?;
    Ok(Json(CountryResponse::from(country)))
}

pub async fn delete_country(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let country_id = parse_object_id(&id).map_err(AppError::from)?;
    let country = state
        .db
        .countries()
        .find_one(doc! { "_id": country_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Country not found")))?;

    if let Some(public_id) = &country.img.public_id {
        if let Err(e) = state.storage.delete(public_id).await {
            tracing::warn!(public_id = %public_id, error = %e, "Failed to delete country image");
        }
    }

    state
        .db
        .countries()
        .delete_one(doc! { "_id": country_id }, None)
        .await?;

    tracing::info!(country = %country.name_id, "Country deleted");
    Ok(Json(MessageResponse::new("Country deleted successfully")))
}

async fn find_country(state: &AppState, id_or_name: &str) -> Result<Country, AppError> {
    let key = id_or_name.trim();
    let filter = match mongodb::bson::oid::ObjectId::parse_str(key) {
        Ok(oid) => doc! { "_id": oid },
        Err(_) => doc! { "name_id": key.to_lowercase() },
    };
    state
        .db
        .countries()
        .find_one(filter, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Country not found")))
}
