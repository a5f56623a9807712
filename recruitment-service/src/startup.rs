use crate::config::RecruitmentConfig;
use crate::services::auth::AuthService;
use crate::services::database::MongoDb;
use crate::services::email::{EmailProvider, SmtpEmailService};
use crate::services::provisioning::ProvisioningService;
use crate::services::session::SessionService;
use crate::services::storage::build_storage;
use crate::{build_router, AppState};
use service_core::error::AppError;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    pub async fn build(config: RecruitmentConfig) -> Result<Self, AppError> {
        let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
        db.initialize_indexes().await.map_err(|e| {
            tracing::error!("Failed to initialize database indexes: {}", e);
            e
        })?;

        let storage = build_storage(&config.storage).await.map_err(|e| {
            tracing::error!("Failed to initialize storage backend: {}", e);
            e
        })?;

        let email: Arc<dyn EmailProvider> = Arc::new(SmtpEmailService::new(&config.smtp)?);

        let sessions = SessionService::new(&config.session, config.secure_cookies());
        let auth_service = AuthService::new(db.clone(), sessions.clone());
        let provisioning =
            ProvisioningService::new(db.clone(), config.provisioning.agent_default_password.clone());

        let state = AppState {
            config: Arc::new(config.clone()),
            db: db.clone(),
            sessions,
            auth_service,
            provisioning,
            storage,
            email,
        };

        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn db(&self) -> &MongoDb {
        &self.state.db
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
