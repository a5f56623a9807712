use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Agent profile. Created together with an [`AgentDetail`] and a linked
/// account by the provisioning coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub agent_name: String,
    pub country: ObjectId,
    pub agent_detail: ObjectId,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(agent_name: String, country: ObjectId, agent_detail: ObjectId) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            agent_name,
            country,
            agent_detail,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Contact details for an agent. `agent_email` shares one logical uniqueness
/// namespace with account emails; the provisioning coordinator checks both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentDetail {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub agent_email: String,
    pub agent_phone_number: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl AgentDetail {
    pub fn new(agent_email: String, agent_phone_number: String) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            agent_email,
            agent_phone_number,
            created_at: now,
            updated_at: now,
        }
    }
}
