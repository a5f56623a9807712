use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::CookieJar;
use service_core::error::AppError;

use crate::dtos::auth::LoginRequest;
use crate::dtos::MessageResponse;
use crate::middleware::AuthSession;
use crate::utils::validation::ValidatedJson;
use crate::AppState;

/// POST /api/login: checks credentials and sets the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (token, account) = state.auth_service.login(&req.email, &req.password).await?;

    tracing::info!(account = %account.user.id.to_hex(), role = %account.role.role_name, "Login");

    let jar = jar.add(state.sessions.session_cookie(token));
    Ok((jar, Json(MessageResponse::new("Login successful"))))
}

/// POST /api/logout: clears the session cookie. Succeeds whether or not a
/// session was present.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(state.sessions.removal_cookie());
    (jar, Json(MessageResponse::new("Logged out successfully")))
}

/// GET /api/me: identity behind the current session, looked up fresh.
pub async fn me(
    State(state): State<AppState>,
    AuthSession(claims): AuthSession,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.current_user(&claims).await?;
    Ok(Json(response))
}
