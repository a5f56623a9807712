//! REST backend for the recruitment platform: countries, job vacancies,
//! agents, accounts, applicant registrations, news and contact mail, with
//! cookie-based sessions.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::RecruitmentConfig;
use crate::services::auth::AuthService;
use crate::services::database::MongoDb;
use crate::services::email::EmailProvider;
use crate::services::provisioning::ProvisioningService;
use crate::services::session::SessionService;
use crate::services::storage::ObjectStorage;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RecruitmentConfig>,
    pub db: MongoDb,
    pub sessions: SessionService,
    pub auth_service: AuthService,
    pub provisioning: ProvisioningService,
    pub storage: Arc<dyn ObjectStorage>,
    pub email: Arc<dyn EmailProvider>,
}

/// All routes live under `/api`; only `/api/me` sits behind the session
/// check, matching the public-by-default shape of the API.
pub fn build_router(state: AppState) -> Router {
    let session_routes = Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ));

    let api = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        .merge(session_routes)
        .route(
            "/roles",
            post(handlers::roles::create_role).get(handlers::roles::list_roles),
        )
        .route(
            "/roles/:id",
            get(handlers::roles::get_role)
                .put(handlers::roles::update_role)
                .delete(handlers::roles::delete_role),
        )
        .route(
            "/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route(
            "/users/:id",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route("/users/:id/status", patch(handlers::users::update_user_status))
        .route(
            "/agents",
            post(handlers::agents::create_agent).get(handlers::agents::list_agents),
        )
        .route(
            "/agents/:id",
            get(handlers::agents::get_agent)
                .put(handlers::agents::update_agent)
                .delete(handlers::agents::delete_agent),
        )
        .route(
            "/countries",
            post(handlers::countries::create_country).get(handlers::countries::list_countries),
        )
        .route(
            "/countries/:id",
            get(handlers::countries::get_country)
                .put(handlers::countries::update_country)
                .delete(handlers::countries::delete_country),
        )
        .route(
            "/jobs",
            post(handlers::jobs::create_job).get(handlers::jobs::list_jobs),
        )
        .route("/jobcountries", get(handlers::jobs::list_job_countries))
        .route(
            "/jobs/:id",
            get(handlers::jobs::get_job)
                .put(handlers::jobs::update_job)
                .delete(handlers::jobs::delete_job),
        )
        .route("/jobs/:id/status", patch(handlers::jobs::update_job_status))
        .route(
            "/news",
            post(handlers::news::create_news).get(handlers::news::list_news),
        )
        .route(
            "/news/:id",
            get(handlers::news::get_news)
                .put(handlers::news::update_news)
                .delete(handlers::news::delete_news),
        )
        .route(
            "/registrations",
            post(handlers::registrations::create_registration)
                .get(handlers::registrations::list_registrations),
        )
        .route("/registrations/:id", get(handlers::registrations::get_registration))
        .route("/contact", post(handlers::contact::send_contact));

    // Leave room for multipart boundaries on top of the per-file limit.
    let body_limit = state.config.upload.max_size_bytes() * 8;

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors_layer(&state.config))
        .layer(axum::middleware::from_fn(
            service_core::middleware::security_headers_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &RecruitmentConfig) -> CorsLayer {
    if config.security.allowed_origins.iter().any(|o| o == "*") {
        // Wildcard cannot be combined with credentials; dev convenience only.
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .security
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
