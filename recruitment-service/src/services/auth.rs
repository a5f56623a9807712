use mongodb::bson::{doc, oid::ObjectId};

use crate::dtos::auth::{MeResponse, RoleRef};
use crate::models::{Role, User};
use crate::services::database::MongoDb;
use crate::services::error::ServiceError;
use crate::services::session::{SessionClaims, SessionService};
use crate::utils::password::verify_password;

/// Identity resolved during login: the account, its role and, for agent
/// accounts, a human-readable agent label for the session claims.
#[derive(Debug, Clone)]
pub struct ResolvedAccount {
    pub user: User,
    pub role: Role,
    pub agent_label: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    db: MongoDb,
    sessions: SessionService,
}

impl AuthService {
    pub fn new(db: MongoDb, sessions: SessionService) -> Self {
        Self { db, sessions }
    }

    /// Checks credentials and resolves the account's role and agent link.
    ///
    /// Unknown email and wrong password produce the same error, so the
    /// response does not reveal which accounts exist. The inactive check runs
    /// only after the password has matched for the same reason.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ResolvedAccount, ServiceError> {
        let email = email.trim().to_lowercase();
        let user = self
            .db
            .users()
            .find_one(doc! { "email": &email }, None)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !verify_password(password, &user.password)? {
            return Err(ServiceError::InvalidCredentials);
        }

        if !user.status {
            return Err(ServiceError::InactiveAccount);
        }

        let role = self
            .db
            .roles()
            .find_one(doc! { "_id": user.role }, None)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal(anyhow::anyhow!(
                    "account {} references missing role {}",
                    user.id.to_hex(),
                    user.role.to_hex()
                ))
            })?;

        let agent_label = match user.agent {
            Some(agent_id) => Some(self.agent_label(agent_id).await?),
            None => None,
        };

        Ok(ResolvedAccount { user, role, agent_label })
    }

    /// Authenticates and issues a signed session token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, ResolvedAccount), ServiceError> {
        let account = self.authenticate(email, password).await?;
        let token = self.sessions.issue(
            &account.user.id.to_hex(),
            &account.user.email,
            &account.role.role_name,
            account.agent_label.clone(),
        )?;
        Ok((token, account))
    }

    /// Loads the account behind a validated session. The lookup is fresh: a
    /// deleted account gets 404 even while its token is still unexpired.
    pub async fn current_user(&self, claims: &SessionClaims) -> Result<MeResponse, ServiceError> {
        let account_id =
            ObjectId::parse_str(&claims.sub).map_err(|_| ServiceError::AccountNotFound)?;

        let user = self
            .db
            .users()
            .find_one(doc! { "_id": account_id }, None)
            .await?
            .ok_or(ServiceError::AccountNotFound)?;

        let role = self
            .db
            .roles()
            .find_one(doc! { "_id": user.role }, None)
            .await?;

        Ok(MeResponse {
            id: user.id.to_hex(),
            email: user.email,
            role: role.map(|r| RoleRef {
                id: r.id.to_hex(),
                role_name: r.role_name,
            }),
        })
    }

    /// Prefers the agent's name for the session claim, falling back to the
    /// raw ID when the profile has gone missing.
    async fn agent_label(&self, agent_id: ObjectId) -> Result<String, ServiceError> {
        let agent = self
            .db
            .agents()
            .find_one(doc! { "_id": agent_id }, None)
            .await?;
        Ok(agent
            .map(|a| a.agent_name)
            .unwrap_or_else(|| agent_id.to_hex()))
    }
}
