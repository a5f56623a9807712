use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgentRequest {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub agent_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub agent_email: String,
    #[validate(custom(function = validate_phone))]
    pub agent_phone_number: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub country: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAgentRequest {
    pub agent_name: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub agent_email: Option<String>,
    #[validate(custom(function = validate_phone))]
    pub agent_phone_number: Option<String>,
    pub country: Option<String>,
}

/// 10 to 15 digits, optional leading `+`.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 10 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("phone");
        err.message = Some("must be 10 to 15 digits".into());
        return Err(err);
    }
    Ok(())
}

/// Filters specific to the agent listing; paging and sorting come from the
/// shared list params extracted alongside.
#[derive(Debug, Deserialize)]
pub struct AgentFilter {
    #[serde(rename = "agentName")]
    pub agent_name: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountryRef {
    pub id: String,
    pub name_id: String,
    pub name_en: String,
}

#[derive(Debug, Serialize)]
pub struct AgentDetailRef {
    pub id: String,
    pub agent_email: String,
    pub agent_phone_number: String,
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub id: String,
    pub agent_name: String,
    pub country: CountryRef,
    pub agent_detail: AgentDetailRef,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creation response: the populated agent plus a message naming the login
/// account that was provisioned alongside it.
#[derive(Debug, Serialize)]
pub struct CreatedAgentResponse {
    pub message: String,
    #[serde(flatten)]
    pub agent: AgentResponse,
}

impl CreatedAgentResponse {
    pub fn new(agent: AgentResponse) -> Self {
        Self {
            message: format!(
                "Agent created along with user account ({})",
                agent.agent_detail.agent_email
            ),
            agent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_validation_bounds() {
        assert!(validate_phone("0812345678").is_ok());
        assert!(validate_phone("+628123456789").is_ok());
        assert!(validate_phone("123").is_err());
        assert!(validate_phone("1234567890123456").is_err());
        assert!(validate_phone("08123abc78").is_err());
    }

    #[test]
    fn create_request_rejects_bad_email() {
        let req = CreateAgentRequest {
            agent_name: "acme".to_string(),
            agent_email: "not-an-email".to_string(),
            agent_phone_number: "0812345678".to_string(),
            country: "64f0aa11bb22cc33dd44ee55".to_string(),
        };
        assert!(req.validate().is_err());
    }
}
