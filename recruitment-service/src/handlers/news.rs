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

use crate::dtos::news::{NewsFilter, NewsResponse};
use crate::dtos::{MessageResponse, PagedResponse};
use crate::models::{News, StoredAsset};
use crate::services::provisioning::parse_object_id;
use crate::services::storage::AssetKind;
use crate::utils::multipart::{missing_fields, FormData};
use crate::utils::query::{select_fields, ListParams};
use crate::AppState;

pub async fn create_news(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let form = FormData::read(multipart, state.config.upload.max_size_bytes()).await?;

    let missing = missing_fields(
        &form,
        &["title_id", "title_en", "desc_id", "desc_en"],
        &["img"],
    );
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

    let asset = state
        .storage
        .upload(img.data.clone(), &img.filename, AssetKind::Image)
        .await?;

    let news = News::new(
        form.text("title_id").unwrap_or_default().to_string(),
        form.text("title_en").unwrap_or_default().to_string(),
        form.text("desc_id").unwrap_or_default().to_string(),
        form.text("desc_en").unwrap_or_default().to_string(),
        StoredAsset {
            url: asset.url,
            public_id: Some(asset.public_id.clone()),
        },
    );

    if let Err(e) = state.db.news().insert_one(&news, None).await {
        if let Err(del) = state.storage.delete(&asset.public_id).await {
            tracing::warn!(public_id = %asset.public_id, error = %del, "Failed to clean up asset after insert error");
        }
        return Err(AppError::from(e));
    }

    tracing::info!(news = %news.id.to_hex(), "News article created");
    Ok((StatusCode::CREATED, Json(NewsResponse::from(news))))
}

pub async fn list_news(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<NewsFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = Document::new();
    if let Some(title) = filter.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        query.insert(
            "$or",
            vec![
                doc! { "title_id": { "$regex": title, "$options": "i" } },
                doc! { "title_en": { "$regex": title, "$options": "i" } },
            ],
        );
    }

    let total = state.db.news().count_documents(query.clone(), None).await?;

    let options = FindOptions::builder()
        .sort(params.sort_doc(doc! { "created_at": -1 }))
        .skip(params.skip())
        .limit(params.limit() as i64)
        .build();

    let news: Vec<News> = state
        .db
        .news()
        .find(query, options)
        .await?
        .try_collect()
        .await?;

    let data: Vec<serde_json::Value> = news
        .into_iter()
        .map(|n| serde_json::to_value(NewsResponse::from(n)))
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::InternalError(e.into()))?;

    Ok(Json(PagedResponse::new(
        select_fields(data, &params),
        total,
        params.page(),
        params.limit(),
    )))
}

pub async fn get_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let news_id = parse_object_id(&id).map_err(AppError::from)?;
    let news = state
        .db
        .news()
        .find_one(doc! { "_id": news_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("News article not found")))?;
    Ok(Json(NewsResponse::from(news)))
}

pub async fn update_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let news_id = parse_object_id(&id).map_err(AppError::from)?;
    let existing = state
        .db
        .news()
        .find_one(doc! { "_id": news_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("News article not found")))?;

    let form = FormData::read(multipart, state.config.upload.max_size_bytes()).await?;
    let mut update = doc! { "updated_at": BsonDateTime::now() };

    for field in ["title_id", "title_en", "desc_id", "desc_en"] {
        if let Some(value) = form.text(field) {
            update.insert(field, value);
        }
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
        .news()
        .update_one(doc! { "_id": news_id }, doc! { "$set": update }, None)
        .await?;

    if let Some(public_id) = old_public_id {
        if let Err(e) = state.storage.delete(&public_id).await {
            tracing::warn!(public_id = %public_id, error = %e, "Failed to delete replaced news image");
        }
    }

    let news = state
        .db
        .news()
        .find_one(doc! { "_id": news_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("News article not found")))?;
    Ok(Json(NewsResponse::from(news)))
}

pub async fn delete_news(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let news_id = parse_object_id(&id).map_err(AppError::from)?;
    let news = state
        .db
        .news()
        .find_one(doc! { "_id": news_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("News article not found")))?;

    if let Some(public_id) = &news.img.public_id {
        if let Err(e) = state.storage.delete(public_id).await {
            tracing::warn!(public_id = %public_id, error = %e, "Failed to delete news image");
        }
    }

    state.db.news().delete_one(doc! { "_id": news_id }, None).await?;
    Ok(Json(MessageResponse::new("News article deleted successfully")))
}
