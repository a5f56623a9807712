use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::FindOptions;
use service_core::error::AppError;

use crate::dtos::role::{CreateRoleRequest, RoleResponse, UpdateRoleRequest};
use crate::dtos::{MessageResponse, PagedResponse};
use crate::models::Role;
use crate::services::provisioning::parse_object_id;
use crate::utils::query::{select_fields, ListParams};
use crate::utils::validation::ValidatedJson;
use crate::AppState;

pub async fn create_role(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role = Role::new(&req.role_name);

    if state
        .db
        .roles()
        .find_one(doc! { "role_name": &role.role_name }, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow::anyhow!("Role already exists")));
    }

    state.db.roles().insert_one(&role, None).await?;
    tracing::info!(role = %role.role_name, "Role created");

    Ok((StatusCode::CREATED, Json(RoleResponse::from(role))))
}

pub async fn list_roles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let total = state.db.roles().count_documents(None, None).await?;
    if total == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("No roles found")));
    }

    let options = FindOptions::builder()
        .sort(params.sort_doc(doc! { "role_name": 1 }))
        .skip(params.skip())
        .limit(params.limit() as i64)
        .build();

    let roles: Vec<Role> = state.db.roles().find(None, options).await?.try_collect().await?;

    let data: Vec<serde_json::Value> = roles
        .into_iter()
        .map(|r| serde_json::to_value(RoleResponse::from(r)))
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::InternalError(e.into()))?;

    Ok(Json(PagedResponse::new(
        select_fields(data, &params),
        total,
        params.page(),
        params.limit(),
    )))
}

pub async fn get_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let role_id = parse_object_id(&id).map_err(AppError::from)?;
    let role = state
        .db
        .roles()
        .find_one(doc! { "_id": role_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Role not found")))?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let role_id = parse_object_id(&id).map_err(AppError::from)?;
    let role_name = req.role_name.trim().to_lowercase();

    if state
        .db
        .roles()
        .find_one(doc! { "role_name": &role_name, "_id": { "$ne": role_id } }, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow::anyhow!("Role already exists")));
    }

    let result = state
        .db
        .roles()
        .update_one(
            doc! { "_id": role_id },
            doc! { "$set": { "role_name": &role_name, "updated_at": BsonDateTime::now() } },
            None,
        )
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Role not found")));
    }

    let role = state
        .db
        .roles()
        .find_one(doc! { "_id": role_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Role not found")))?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let role_id = parse_object_id(&id).map_err(AppError::from)?;
    let result = state.db.roles().delete_one(doc! { "_id": role_id }, None).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("Role not found")));
    }
    Ok(Json(MessageResponse::new("Role deleted successfully")))
}
