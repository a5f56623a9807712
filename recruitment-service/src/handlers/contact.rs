use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::dtos::contact::ContactRequest;
use crate::dtos::MessageResponse;
use crate::utils::validation::ValidatedJson;
use crate::AppState;

/// POST /api/contact: relays a visitor message to the site inbox.
pub async fn send_contact(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<ContactRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .email
        .send_contact_email(&req.name, &req.email, &req.subject, &req.message)
        .await?;
    Ok(Json(MessageResponse::new("Message sent successfully")))
}
