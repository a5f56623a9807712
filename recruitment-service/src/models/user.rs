use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Account record: the credential store entity.
///
/// `password` holds an argon2 hash, never a plaintext secret. `agent` is set
/// only for agent-role accounts created by the provisioning coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub email: String,
    pub password: String,
    pub role: ObjectId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<ObjectId>,
    pub status: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: String, password_hash: String, role: ObjectId, agent: Option<ObjectId>, status: bool) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            email,
            password: password_hash,
            role,
            agent,
            status,
            created_at: now,
            updated_at: now,
        }
    }
}
