use crate::models::{Agent, AgentDetail, Country, JobVacancy, News, Registration, Role, User};
use mongodb::{
    bson::{doc, Document},
    options::IndexOptions,
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(uri = %uri, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB at {}: {}", uri, e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    /// Unique indexes back every uniqueness rule the API promises. Duplicate
    /// key violations surface as Conflict through the shared error mapping,
    /// which closes the race left open by check-then-insert alone.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for recruitment-service");

        self.create_unique_index(&self.users(), doc! { "email": 1 }, "user_email_unique")
            .await?;
        self.create_unique_index(&self.roles(), doc! { "role_name": 1 }, "role_name_unique")
            .await?;
        self.create_unique_index(&self.agents(), doc! { "agent_name": 1 }, "agent_name_unique")
            .await?;
        self.create_unique_index(
            &self.agent_details(),
            doc! { "agent_email": 1 },
            "agent_email_unique",
        )
        .await?;
        self.create_unique_index(&self.countries(), doc! { "name_id": 1 }, "country_name_unique")
            .await?;

        Ok(())
    }

    async fn create_unique_index<T>(
        &self,
        collection: &Collection<T>,
        keys: Document,
        name: &str,
    ) -> Result<(), AppError> {
        let index = IndexModel::builder()
            .keys(keys.clone())
            .options(
                IndexOptions::builder()
                    .name(name.to_string())
                    .unique(true)
                    .build(),
            )
            .build();

        collection.create_index(index, None).await.map_err(|e| {
            tracing::error!(
                "Failed to create index {} on {}: {}",
                name,
                collection.name(),
                e
            );
            AppError::from(e)
        })?;
        tracing::info!(index = %name, collection = %collection.name(), keys = %keys, "Created index");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn roles(&self) -> Collection<Role> {
        self.db.collection("roles")
    }

    pub fn agents(&self) -> Collection<Agent> {
        self.db.collection("agents")
    }

    pub fn agent_details(&self) -> Collection<AgentDetail> {
        self.db.collection("agent_details")
    }

    pub fn countries(&self) -> Collection<Country> {
        self.db.collection("countries")
    }

    pub fn news(&self) -> Collection<News> {
        self.db.collection("news")
    }

    pub fn job_vacancies(&self) -> Collection<JobVacancy> {
        self.db.collection("job_vacancies")
    }

    pub fn registrations(&self) -> Collection<Registration> {
        self.db.collection("registrations")
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}
