use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoleRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub role_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRoleRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub role_name: String,
}

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub role_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::models::Role> for RoleResponse {
    fn from(role: crate::models::Role) -> Self {
        Self {
            id: role.id.to_hex(),
            role_name: role.role_name,
            created_at: role.created_at,
            updated_at: role.updated_at,
        }
    }
}
