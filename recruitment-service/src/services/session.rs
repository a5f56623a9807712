use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use service_core::error::AppError;

use crate::config::SessionConfig;

pub const SESSION_COOKIE_NAME: &str = "token";

/// Issues and validates the signed session tokens carried by the `token`
/// cookie.
#[derive(Clone)]
pub struct SessionService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: i64,
    secure_cookies: bool,
}

/// Claims embedded in a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (account ID, hex)
    pub sub: String,
    pub email: String,
    /// Role name, resolved at login
    pub role: String,
    /// Agent name (or ID) for agent accounts; absent otherwise
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl SessionService {
    pub fn new(config: &SessionConfig, secure_cookies: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            expiry_hours: config.expiry_hours,
            secure_cookies,
        }
    }

    /// Signs a new session token for the given identity.
    pub fn issue(
        &self,
        account_id: &str,
        email: &str,
        role: &str,
        agent: Option<String>,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now + Duration::hours(self.expiry_hours);

        let claims = SessionClaims {
            sub: account_id.to_string(),
            email: email.to_string(),
            role: role.to_string(),
            agent,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validates signature and expiry, returning the claims. Expiry is exact:
    /// no leeway is granted past the `exp` timestamp.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Builds the session cookie carrying `token`.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure_cookies)
            .max_age(time::Duration::hours(self.expiry_hours))
            .build()
    }

    /// Builds an expired cookie that instructs the browser to drop the
    /// session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE_NAME, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure_cookies)
            .max_age(time::Duration::ZERO)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_service(expiry_hours: i64) -> SessionService {
        SessionService::new(
            &SessionConfig {
                secret: "test-session-secret-at-least-32-bytes!".to_string(),
                expiry_hours,
            },
            false,
        )
    }

    #[test]
    fn issue_then_validate_roundtrip() {
        let service = test_service(24);
        let token = service
            .issue("64f0aa11bb22cc33dd44ee55", "admin@example.com", "admin", None)
            .unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.sub, "64f0aa11bb22cc33dd44ee55");
        assert_eq!(claims.email, "admin@example.com");
        assert_eq!(claims.role, "admin");
        assert!(claims.agent.is_none());
    }

    #[test]
    fn agent_claim_is_carried() {
        let service = test_service(24);
        let token = service
            .issue("64f0aa11bb22cc33dd44ee55", "a@example.com", "agent", Some("acme".to_string()))
            .unwrap();
        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.agent.as_deref(), Some("acme"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let service = test_service(-1);
        let token = service
            .issue("64f0aa11bb22cc33dd44ee55", "a@example.com", "admin", None)
            .unwrap();
        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let service = test_service(24);
        let other = SessionService::new(
            &SessionConfig {
                secret: "a-different-secret-also-32-bytes-long!".to_string(),
                expiry_hours: 24,
            },
            false,
        );
        let token = other
            .issue("64f0aa11bb22cc33dd44ee55", "a@example.com", "admin", None)
            .unwrap();
        assert!(service.validate(&token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let service = test_service(24);
        assert!(service.validate("not.a.jwt").is_err());
        assert!(service.validate("").is_err());
    }

    #[test]
    fn session_cookie_flags() {
        let service = test_service(24);
        let cookie = service.session_cookie("abc".to_string());
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.max_age(), Some(time::Duration::hours(24)));
    }

    #[test]
    fn token_outlives_logout_until_expiry() {
        // There is no server-side revocation list; clearing the cookie does
        // not invalidate an already-issued token.
        let service = test_service(24);
        let token = service
            .issue("64f0aa11bb22cc33dd44ee55", "a@example.com", "admin", None)
            .unwrap();
        let _ = service.removal_cookie();
        assert!(service.validate(&token).is_ok());
    }

    #[test]
    fn removal_cookie_expires_immediately() {
        let service = test_service(24);
        let cookie = service.removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE_NAME);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(time::Duration::ZERO));
    }
}
