use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct RecruitmentConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub mongodb: MongoConfig,
    pub session: SessionConfig,
    pub provisioning: ProvisioningConfig,
    pub smtp: SmtpConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProvisioningConfig {
    pub agent_default_password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub user: String,
    pub app_password: String,
    pub contact_recipient: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_path: Option<String>,
    pub public_base_url: Option<String>,
    pub remote_base_url: Option<String>,
    pub remote_api_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    Remote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_size_mb: u64,
}

impl UploadConfig {
    pub fn max_size_bytes(&self) -> usize {
        (self.max_size_mb * 1024 * 1024) as usize
    }
}

impl RecruitmentConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = RecruitmentConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("recruitment-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("recruitment"), is_prod)?,
            },
            session: SessionConfig {
                secret: get_env("JWT_SECRET", Some("dev-only-session-secret"), is_prod)?,
                expiry_hours: get_env("SESSION_EXPIRY_HOURS", Some("24"), is_prod)?
                    .parse()
                    .map_err(|e: std::num::ParseIntError| {
                        AppError::ConfigError(anyhow::anyhow!(e.to_string()))
                    })?,
            },
            provisioning: ProvisioningConfig {
                agent_default_password: get_env(
                    "AGENT_DEFAULT_PASSWORD",
                    Some("agent-password"),
                    is_prod,
                )?,
            },
            smtp: SmtpConfig {
                user: get_env("SMTP_USER", Some("noreply@example.com"), is_prod)?,
                app_password: get_env("SMTP_APP_PASSWORD", Some(""), is_prod)?,
                contact_recipient: get_env(
                    "CONTACT_RECIPIENT",
                    Some("contact@example.com"),
                    is_prod,
                )?,
            },
            storage: StorageConfig {
                backend: get_env("STORAGE_BACKEND", Some("local"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                local_path: Some(get_env("STORAGE_LOCAL_PATH", Some("storage"), is_prod)?),
                public_base_url: Some(get_env(
                    "STORAGE_PUBLIC_BASE_URL",
                    Some("http://localhost:8080/storage"),
                    is_prod,
                )?),
                remote_base_url: env::var("STORAGE_REMOTE_BASE_URL").ok(),
                remote_api_token: env::var("STORAGE_REMOTE_API_TOKEN").ok(),
            },
            security: SecurityConfig {
                allowed_origins: get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            },
            upload: UploadConfig {
                max_size_mb: get_env("MAX_UPLOAD_SIZE_MB", Some("5"), is_prod)?
                    .parse()
                    .unwrap_or(5),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Prod
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.session.expiry_hours <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SESSION_EXPIRY_HOURS must be positive"
            )));
        }

        if self.environment == Environment::Prod {
            if self.session.secret.len() < 32 {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET must be at least 32 bytes in production"
                )));
            }

            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.storage.backend == StorageBackend::Remote
                && self.storage.remote_base_url.is_none()
            {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "STORAGE_REMOTE_BASE_URL is required for the remote storage backend"
                )));
            }
        }

        Ok(())
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "remote" => Ok(StorageBackend::Remote),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!("DEV".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn storage_backend_parses() {
        assert_eq!(
            "local".parse::<StorageBackend>().unwrap(),
            StorageBackend::Local
        );
        assert_eq!(
            "Remote".parse::<StorageBackend>().unwrap(),
            StorageBackend::Remote
        );
        assert!("s3".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn upload_config_converts_to_bytes() {
        let upload = UploadConfig { max_size_mb: 5 };
        assert_eq!(upload.max_size_bytes(), 5 * 1024 * 1024);
    }
}
