use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::dtos::agent::{AgentFilter, CreateAgentRequest, CreatedAgentResponse, UpdateAgentRequest};
use crate::dtos::{MessageResponse, PagedResponse};
use crate::utils::query::{select_fields, ListParams};
use crate::utils::validation::ValidatedJson;
use crate::AppState;

pub async fn create_agent(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateAgentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let agent = state.provisioning.create_agent(req).await?;
    Ok((StatusCode::CREATED, Json(CreatedAgentResponse::new(agent))))
}

pub async fn list_agents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
    Query(filter): Query<AgentFilter>,
) -> Result<impl IntoResponse, AppError> {
    let (agents, total) = state
        .provisioning
        .list_agents(
            &params,
            filter.agent_name.as_deref(),
            filter.start_date.as_deref(),
            filter.end_date.as_deref(),
        )
        .await?;

    let data: Vec<serde_json::Value> = agents
        .into_iter()
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

pub async fn get_agent(
    State(state): State<AppState>,
    Path(id_or_name): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let agent = state.provisioning.get_agent(&id_or_name).await?;
    Ok(Json(agent))
}

pub async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateAgentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let agent = state.provisioning.update_agent(&id, req).await?;
    Ok(Json(agent))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.provisioning.delete_agent(&id).await?;
    Ok(Json(MessageResponse::new("Agent deleted successfully")))
}
