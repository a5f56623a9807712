#![allow(dead_code)]

use axum::Router;
use recruitment_service::config::{
    Environment, MongoConfig, ProvisioningConfig, RecruitmentConfig, SecurityConfig,
    SessionConfig, SmtpConfig, StorageBackend, StorageConfig, UploadConfig,
};
use recruitment_service::services::auth::AuthService;
use recruitment_service::services::database::MongoDb;
use recruitment_service::services::email::MockEmailService;
use recruitment_service::services::provisioning::ProvisioningService;
use recruitment_service::services::session::SessionService;
use recruitment_service::services::storage::LocalStorage;
use recruitment_service::startup::Application;
use recruitment_service::{build_router, AppState};
use std::sync::Arc;
use uuid::Uuid;

pub const TEST_SESSION_SECRET: &str = "test-session-secret-at-least-32-bytes!";
pub const AGENT_DEFAULT_PASSWORD: &str = "agent-test-password";

pub fn test_config(database: String, storage_path: String) -> RecruitmentConfig {
    RecruitmentConfig {
        common: service_core::config::Config { port: 0 },
        environment: Environment::Dev,
        service_name: "recruitment-service-test".to_string(),
        log_level: "error".to_string(),
        mongodb: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database,
        },
        session: SessionConfig {
            secret: TEST_SESSION_SECRET.to_string(),
            expiry_hours: 24,
        },
        provisioning: ProvisioningConfig {
            agent_default_password: AGENT_DEFAULT_PASSWORD.to_string(),
        },
        smtp: SmtpConfig {
            user: "noreply@example.com".to_string(),
            app_password: String::new(),
            contact_recipient: "inbox@example.com".to_string(),
        },
        storage: StorageConfig {
            backend: StorageBackend::Local,
            local_path: Some(storage_path),
            public_base_url: Some("http://localhost:8080/storage".to_string()),
            remote_base_url: None,
            remote_api_token: None,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        upload: UploadConfig { max_size_mb: 5 },
    }
}

/// Router over an in-process state. The Mongo client connects lazily, so
/// routes that never reach the database can be exercised without a server.
pub async fn test_router() -> Router {
    let storage_path = format!("target/test-storage-{}", Uuid::new_v4());
    let config = test_config(format!("recruitment_test_{}", Uuid::new_v4()), storage_path.clone());

    let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
        .await
        .expect("lazy client construction should not fail");
    let sessions = SessionService::new(&config.session, config.secure_cookies());
    let auth_service = AuthService::new(db.clone(), sessions.clone());
    let provisioning =
        ProvisioningService::new(db.clone(), config.provisioning.agent_default_password.clone());
    let storage = LocalStorage::new(&storage_path, "http://localhost:8080/storage".to_string())
        .await
        .expect("local storage in target/");

    build_router(AppState {
        config: Arc::new(config),
        db,
        sessions,
        auth_service,
        provisioning,
        storage: Arc::new(storage),
        email: Arc::new(MockEmailService),
    })
}

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
}

impl TestApp {
    /// Boots the full application against a throwaway database. Requires a
    /// MongoDB replica set on localhost:27017.
    pub async fn spawn() -> Self {
        let db_name = format!("recruitment_test_{}", Uuid::new_v4());
        let storage_path = format!("target/test-storage-{}", Uuid::new_v4());
        let config = test_config(db_name.clone(), storage_path);

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            port,
            db,
            db_name,
        }
    }

    pub async fn cleanup(&self) {
        self.db.database().drop(None).await.ok();
    }
}
