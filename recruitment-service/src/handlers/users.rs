use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::FindOptions;
use service_core::error::AppError;
use std::collections::HashMap;

use crate::dtos::auth::RoleRef;
use crate::dtos::user::{
    CreateUserRequest, UpdateStatusRequest, UpdateUserRequest, UserFilter, UserResponse,
};
use crate::dtos::{MessageResponse, PagedResponse};
use crate::models::{Role, User};
use crate::services::provisioning::parse_object_id;
use crate::utils::password::hash_password;
use crate::utils::query::{select_fields, ListParams};
use crate::utils::validation::ValidatedJson;
use crate::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = req.email.trim().to_lowercase();

    if state
        .db
        .users()
        .find_one(doc! { "email": &email }, None)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "An account with this email already exists"
        )));
    }

    let role_id = parse_object_id(&req.role).map_err(AppError::from)?;
    let role = state
        .db
        .roles()
        .find_one(doc! { "_id": role_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Role not found")))?;

    let agent_id = match req.agent.as_deref() {
        Some(raw) => {
            let agent_id = parse_object_id(raw).map_err(AppError::from)?;
            state
                .db
                .agents()
                .find_one(doc! { "_id": agent_id }, None)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Agent not found")))?;
            Some(agent_id)
        }
        None => None,
    };

    let password_hash = hash_password(&req.password)?;
    let user = User::new(email, password_hash, role.id, agent_id, req.status.unwrap_or(true));

    state.db.users().insert_one(&user, None).await?;
    tracing::info!(account = %user.id.to_hex(), role = %role.role_name, "User created");

    Ok((StatusCode::CREATED, Json(to_response(user, Some(role)))))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<UserFilter>,
) -> Result<impl IntoResponse, AppError> {
    let mut query = Document::new();
    if let Some(email) = filter.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        query.insert("email", doc! { "$regex": email, "$options": "i" });
    }

    let total = state.db.users().count_documents(query.clone(), None).await?;

    let options = FindOptions::builder()
        .sort(params.sort_doc(doc! { "created_at": -1 }))
        .skip(params.skip())
        .limit(params.limit() as i64)
        .build();

    let users: Vec<User> = state
        .db
        .users()
        .find(query, options)
        .await?
        .try_collect()
        .await?;

    let roles = load_roles(&state, users.iter().map(|u| u.role)).await?;

    let data: Vec<serde_json::Value> = users
        .into_iter()
        .map(|u| {
            let role = roles.get(&u.role).cloned();
            serde_json::to_value(to_response(u, role))
        })
        .collect::<Result<_, _>>()
        .map_err(|e| AppError::InternalError(e.into()))?;

    Ok(Json(PagedResponse::new(
        select_fields(data, &params),
        total,
        params.page(),
        params.limit(),
    )))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_object_id(&id).map_err(AppError::from)?;
    let user = state
        .db
        .users()
        .find_one(doc! { "_id": user_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    let role = state.db.roles().find_one(doc! { "_id": user.role }, None).await?;
    Ok(Json(to_response(user, role)))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_object_id(&id).map_err(AppError::from)?;
    let mut update = doc! { "updated_at": BsonDateTime::now() };

    if let Some(email) = req.email.as_deref().map(str::trim) {
        let email = email.to_lowercase();
        if state
            .db
            .users()
            .find_one(doc! { "email": &email, "_id": { "$ne": user_id } }, None)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "An account with this email already exists"
            )));
        }
        update.insert("email", email);
    }

    if let Some(role) = req.role.as_deref() {
        let role_id = parse_object_id(role).map_err(AppError::from)?;
        state
            .db
            .roles()
            .find_one(doc! { "_id": role_id }, None)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Role not found")))?;
        update.insert("role", role_id);
    }

    if let Some(password) = req.password.as_deref() {
        update.insert("password", hash_password(password)?);
    }

    if let Some(status) = req.status {
        update.insert("status", status);
    }

    let result = state
        .db
        .users()
        .update_one(doc! { "_id": user_id }, doc! { "$set": update }, None)
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("User not found")));
    }

    let user = state
        .db
        .users()
        .find_one(doc! { "_id": user_id }, None)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;
    let role = state.db.roles().find_one(doc! { "_id": user.role }, None).await?;
    Ok(Json(to_response(user, role)))
}

/// Flipping `status` to false locks the account out at the next login
/// without destroying any data.
pub async fn update_user_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_object_id(&id).map_err(AppError::from)?;
    let result = state
        .db
        .users()
        .update_one(
            doc! { "_id": user_id },
            doc! { "$set": { "status": req.status, "updated_at": BsonDateTime::now() } },
            None,
        )
        .await?;
    if result.matched_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("User not found")));
    }
    Ok(Json(MessageResponse::new("User status updated")))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = parse_object_id(&id).map_err(AppError::from)?;
    let result = state.db.users().delete_one(doc! { "_id": user_id }, None).await?;
    if result.deleted_count == 0 {
        return Err(AppError::NotFound(anyhow::anyhow!("User not found")));
    }
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

async fn load_roles(
    state: &AppState,
    role_ids: impl Iterator<Item = ObjectId>,
) -> Result<HashMap<ObjectId, Role>, AppError> {
    let ids: Vec<ObjectId> = role_ids.collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let roles: Vec<Role> = state
        .db
        .roles()
        .find(doc! { "_id": { "$in": ids } }, None)
        .await?
        .try_collect()
        .await?;
    Ok(roles.into_iter().map(|r| (r.id, r)).collect())
}

fn to_response(user: User, role: Option<Role>) -> UserResponse {
    UserResponse {
        id: user.id.to_hex(),
        email: user.email,
        role: role.map(|r| RoleRef {
            id: r.id.to_hex(),
            role_name: r.role_name,
        }),
        agent: user.agent.map(|a| a.to_hex()),
        status: user.status,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}
