use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Named role referenced by accounts. Names are normalized to lowercase and
/// unique; the seeded set is `superadmin`, `admin`, `agent`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub role_name: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn new(role_name: &str) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            role_name: role_name.trim().to_lowercase(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_name_is_normalized() {
        let role = Role::new("  SuperAdmin ");
        assert_eq!(role.role_name, "superadmin");
    }
}
