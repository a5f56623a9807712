use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime, Document};
use mongodb::options::FindOptions;

use crate::dtos::agent::{AgentDetailRef, AgentResponse, CountryRef, CreateAgentRequest, UpdateAgentRequest};
use crate::models::{Agent, AgentDetail, User};
use crate::services::database::MongoDb;
use crate::services::error::ServiceError;
use crate::utils::password::hash_password;
use crate::utils::query::{date_range_filter, ListParams};
use futures::TryStreamExt;

/// Coordinates the multi-collection lifecycle of an agent: one profile, one
/// contact-detail record and one login account, created and removed together.
#[derive(Clone)]
pub struct ProvisioningService {
    db: MongoDb,
    default_password: String,
}

impl ProvisioningService {
    pub fn new(db: MongoDb, default_password: String) -> Self {
        Self { db, default_password }
    }

    /// Creates the detail record, the agent profile and a login account in a
    /// single transaction. Uniqueness is pre-checked for friendly errors, but
    /// the unique indexes are what actually enforce it under concurrency.
    pub async fn create_agent(&self, req: CreateAgentRequest) -> Result<AgentResponse, ServiceError> {
        let country_id = ObjectId::parse_str(req.country.trim())
            .map_err(|_| ServiceError::Validation(format!("Invalid country id: {}", req.country)))?;

        let country = self
            .db
            .countries()
            .find_one(doc! { "_id": country_id }, None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Country not found".to_string()))?;

        let agent_name = req.agent_name.trim().to_string();
        let agent_email = req.agent_email.trim().to_lowercase();
        let agent_phone = req.agent_phone_number.trim().to_string();

        if self
            .db
            .agent_details()
            .find_one(doc! { "agent_email": &agent_email }, None)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict("Agent email already in use".to_string()));
        }

        if self
            .db
            .agents()
            .find_one(doc! { "agent_name": &agent_name }, None)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict("Agent name already in use".to_string()));
        }

        if self
            .db
            .users()
            .find_one(doc! { "email": &agent_email }, None)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let agent_role = self
            .db
            .roles()
            .find_one(doc! { "role_name": "agent" }, None)
            .await?
            .ok_or_else(|| {
                ServiceError::Validation("Agent role is not configured".to_string())
            })?;

        let detail = AgentDetail::new(agent_email.clone(), agent_phone);
        let agent = Agent::new(agent_name, country_id, detail.id);
        let password_hash = hash_password(&self.default_password)?;
        let user = User::new(agent_email, password_hash, agent_role.id, Some(agent.id), true);

        let mut session = self.db.client().start_session(None).await?;
        session.start_transaction(None).await?;

        self.db
            .agent_details()
            .insert_one_with_session(&detail, None, &mut session)
            .await?;
        self.db
            .agents()
            .insert_one_with_session(&agent, None, &mut session)
            .await?;
        self.db
            .users()
            .insert_one_with_session(&user, None, &mut session)
            .await?;

        session.commit_transaction().await?;

        tracing::info!(agent = %agent.agent_name, account = %user.id.to_hex(), "Provisioned agent");

        Ok(AgentResponse {
            id: agent.id.to_hex(),
            agent_name: agent.agent_name,
            country: CountryRef {
                id: country.id.to_hex(),
                name_id: country.name_id,
                name_en: country.name_en,
            },
            agent_detail: AgentDetailRef {
                id: detail.id.to_hex(),
                agent_email: detail.agent_email,
                agent_phone_number: detail.agent_phone_number,
            },
            created_at: agent.created_at,
            updated_at: agent.updated_at,
        })
    }

    /// Applies partial updates across the agent profile, its detail record
    /// and the linked account, excluding the agent's own records from the
    /// uniqueness checks.
    pub async fn update_agent(
        &self,
        id: &str,
        req: UpdateAgentRequest,
    ) -> Result<AgentResponse, ServiceError> {
        let agent_id = parse_object_id(id)?;
        let agent = self
            .db
            .agents()
            .find_one(doc! { "_id": agent_id }, None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Agent not found".to_string()))?;

        let now = BsonDateTime::now();
        let mut agent_update = doc! { "updated_at": now };
        let mut detail_update = doc! { "updated_at": now };
        let mut user_update = Document::new();

        if let Some(agent_name) = req.agent_name.as_deref().map(str::trim) {
            if agent_name.is_empty() {
                return Err(ServiceError::Validation("agent_name must not be empty".to_string()));
            }
            if self
                .db
                .agents()
                .find_one(
                    doc! { "agent_name": agent_name, "_id": { "$ne": agent_id } },
                    None,
                )
                .await?
                .is_some()
            {
                return Err(ServiceError::Conflict("Agent name already in use".to_string()));
            }
            agent_update.insert("agent_name", agent_name);
        }

        if let Some(country) = req.country.as_deref().map(str::trim) {
            let country_id = ObjectId::parse_str(country)
                .map_err(|_| ServiceError::Validation(format!("Invalid country id: {country}")))?;
            if self
                .db
                .countries()
                .find_one(doc! { "_id": country_id }, None)
                .await?
                .is_none()
            {
                return Err(ServiceError::NotFound("Country not found".to_string()));
            }
            agent_update.insert("country", country_id);
        }

        if let Some(agent_email) = req.agent_email.as_deref().map(str::trim) {
            let agent_email = agent_email.to_lowercase();
            if self
                .db
                .agent_details()
                .find_one(
                    doc! { "agent_email": &agent_email, "_id": { "$ne": agent.agent_detail } },
                    None,
                )
                .await?
                .is_some()
            {
                return Err(ServiceError::Conflict("Agent email already in use".to_string()));
            }
            if self
                .db
                .users()
                .find_one(
                    doc! { "email": &agent_email, "agent": { "$ne": agent_id } },
                    None,
                )
                .await?
                .is_some()
            {
                return Err(ServiceError::Conflict(
                    "An account with this email already exists".to_string(),
                ));
            }
            detail_update.insert("agent_email", &agent_email);
            // The login account follows the contact email.
            user_update.insert("email", &agent_email);
        }

        if let Some(phone) = req.agent_phone_number.as_deref().map(str::trim) {
            detail_update.insert("agent_phone_number", phone);
        }

        let mut session = self.db.client().start_session(None).await?;
        session.start_transaction(None).await?;

        self.db
            .agents()
            .update_one_with_session(
                doc! { "_id": agent_id },
                doc! { "$set": agent_update },
                None,
                &mut session,
            )
            .await?;
        self.db
            .agent_details()
            .update_one_with_session(
                doc! { "_id": agent.agent_detail },
                doc! { "$set": detail_update },
                None,
                &mut session,
            )
            .await?;
        if !user_update.is_empty() {
            user_update.insert("updated_at", now);
            self.db
                .users()
                .update_one_with_session(
                    doc! { "agent": agent_id },
                    doc! { "$set": user_update },
                    None,
                    &mut session,
                )
                .await?;
        }

        session.commit_transaction().await?;

        let updated = self
            .db
            .agents()
            .find_one(doc! { "_id": agent_id }, None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Agent not found".to_string()))?;
        self.populate(updated).await
    }

    /// Removes the detail record, the linked login account and the agent
    /// profile in one transaction.
    pub async fn delete_agent(&self, id: &str) -> Result<(), ServiceError> {
        let agent_id = parse_object_id(id)?;
        let agent = self
            .db
            .agents()
            .find_one(doc! { "_id": agent_id }, None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Agent not found".to_string()))?;

        let mut session = self.db.client().start_session(None).await?;
        session.start_transaction(None).await?;

        self.db
            .agent_details()
            .delete_one_with_session(doc! { "_id": agent.agent_detail }, None, &mut session)
            .await?;
        self.db
            .users()
            .delete_many_with_session(doc! { "agent": agent_id }, None, &mut session)
            .await?;
        self.db
            .agents()
            .delete_one_with_session(doc! { "_id": agent_id }, None, &mut session)
            .await?;

        session.commit_transaction().await?;

        tracing::info!(agent = %agent.agent_name, "Deprovisioned agent");
        Ok(())
    }

    /// Paged agent listing with optional name search and creation-date range.
    pub async fn list_agents(
        &self,
        params: &ListParams,
        agent_name: Option<&str>,
        start_date: Option<&str>,
        end_date: Option<&str>,
    ) -> Result<(Vec<AgentResponse>, u64), ServiceError> {
        let mut filter = Document::new();
        if let Some(name) = agent_name.map(str::trim).filter(|n| !n.is_empty()) {
            filter.insert("agent_name", doc! { "$regex": name, "$options": "i" });
        }
        if let Some(range) = date_range_filter(start_date, end_date)? {
            filter.extend(range);
        }

        let total = self.db.agents().count_documents(filter.clone(), None).await?;

        let options = FindOptions::builder()
            .sort(params.sort_doc(doc! { "created_at": -1 }))
            .skip(params.skip())
            .limit(params.limit() as i64)
            .build();

        let agents: Vec<Agent> = self
            .db
            .agents()
            .find(filter, options)
            .await?
            .try_collect()
            .await?;

        let mut out = Vec::with_capacity(agents.len());
        for agent in agents {
            out.push(self.populate(agent).await?);
        }
        Ok((out, total))
    }

    /// Looks an agent up by ObjectId or, failing that, by exact name.
    pub async fn get_agent(&self, id_or_name: &str) -> Result<AgentResponse, ServiceError> {
        let key = id_or_name.trim();
        let filter = match ObjectId::parse_str(key) {
            Ok(oid) => doc! { "_id": oid },
            Err(_) => doc! { "agent_name": key },
        };

        let agent = self
            .db
            .agents()
            .find_one(filter, None)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Agent not found".to_string()))?;
        self.populate(agent).await
    }

    /// Resolves the country and detail references into the response shape.
    async fn populate(&self, agent: Agent) -> Result<AgentResponse, ServiceError> {
        let country = self
            .db
            .countries()
            .find_one(doc! { "_id": agent.country }, None)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal(anyhow::anyhow!(
                    "agent {} references missing country {}",
                    agent.id.to_hex(),
                    agent.country.to_hex()
                ))
            })?;
        let detail = self
            .db
            .agent_details()
            .find_one(doc! { "_id": agent.agent_detail }, None)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal(anyhow::anyhow!(
                    "agent {} references missing detail {}",
                    agent.id.to_hex(),
                    agent.agent_detail.to_hex()
                ))
            })?;

        Ok(AgentResponse {
            id: agent.id.to_hex(),
            agent_name: agent.agent_name,
            country: CountryRef {
                id: country.id.to_hex(),
                name_id: country.name_id,
                name_en: country.name_en,
            },
            agent_detail: AgentDetailRef {
                id: detail.id.to_hex(),
                agent_email: detail.agent_email,
                agent_phone_number: detail.agent_phone_number,
            },
            created_at: agent.created_at,
            updated_at: agent.updated_at,
        })
    }
}

pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id.trim())
        .map_err(|_| ServiceError::Validation(format!("Invalid id: {id}")))
}
