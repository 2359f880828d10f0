use secrecy::{ExposeSecret, Secret};
use service_core::config::{self as core_config, get_env, get_optional_env};
use service_core::error::AppError;
use std::env;
use std::fmt::Display;
use std::str::FromStr;

const DEV_JWT_SECRET: &str = "change-this-jwt-secret-in-prod";
const DEV_SESSION_SECRET: &str = "change-this-secret-in-prod";

#[derive(Debug, Clone)]
pub struct MedAssistConfig {
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub gemini: GeminiSettings,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: Secret<String>,
    pub access_token_expiry_days: i64,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: Secret<String>,
}

/// Gemini credentials. A missing key disables the AI capability; it never stops startup.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: Option<Secret<String>>,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

impl MedAssistConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;

        let env_str = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;

        let config = MedAssistConfig {
            common: common_config,
            environment: environment.clone(),
            service_name: get_env("SERVICE_NAME", Some("medassist-service"), is_prod)?,
            service_version: get_env("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: get_optional_env("OTEL_EXPORTER_OTLP_ENDPOINT"),
            database: DatabaseConfig {
                url: Secret::new(get_env(
                    "DATABASE_URL",
                    Some("postgres://localhost:5432/medassist"),
                    is_prod,
                )?),
                max_connections: parse_setting(
                    "DATABASE_MAX_CONNECTIONS",
                    &get_env("DATABASE_MAX_CONNECTIONS", Some("10"), is_prod)?,
                )?,
                min_connections: parse_setting(
                    "DATABASE_MIN_CONNECTIONS",
                    &get_env("DATABASE_MIN_CONNECTIONS", Some("1"), is_prod)?,
                )?,
            },
            jwt: JwtConfig {
                secret: Secret::new(get_env("JWT_SECRET_KEY", Some(DEV_JWT_SECRET), is_prod)?),
                access_token_expiry_days: parse_setting(
                    "JWT_ACCESS_TOKEN_EXPIRY_DAYS",
                    &get_env("JWT_ACCESS_TOKEN_EXPIRY_DAYS", Some("30"), is_prod)?,
                )?,
            },
            session: SessionConfig {
                secret: Secret::new(get_env("SECRET_KEY", Some(DEV_SESSION_SECRET), is_prod)?),
            },
            gemini: GeminiSettings {
                api_key: get_optional_env("GEMINI_API_KEY")
                    .or_else(|| get_optional_env("GOOGLE_API_KEY"))
                    .map(Secret::new),
                model: get_optional_env("GEMINI_MODEL")
                    .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            },
            security: SecurityConfig {
                allowed_origins: get_env("ALLOWED_ORIGINS", Some("*"), is_prod)?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.common.port == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "PORT must be greater than 0"
            )));
        }

        if self.jwt.access_token_expiry_days <= 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_ACCESS_TOKEN_EXPIRY_DAYS must be positive"
            )));
        }

        if self.jwt.secret.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "JWT_SECRET_KEY must not be empty"
            )));
        }

        if self.session.secret.expose_secret().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "SECRET_KEY must not be empty"
            )));
        }

        if self.environment == Environment::Prod {
            if self.security.allowed_origins.iter().any(|o| o == "*") {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "Wildcard CORS origin not allowed in production"
                )));
            }

            if self.jwt.secret.expose_secret() == self.session.secret.expose_secret() {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET_KEY and SECRET_KEY must differ in production"
                )));
            }

            if self.jwt.secret.expose_secret() == DEV_JWT_SECRET {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "JWT_SECRET_KEY still holds the development placeholder"
                )));
            }
        }

        if self.gemini.api_key.is_none() {
            tracing::warn!("No Gemini API key configured; AI endpoints will use their fallbacks");
        }

        Ok(())
    }
}

/// Parse a numeric setting, naming the variable when the value is malformed.
fn parse_setting<T>(name: &str, raw: &str) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::ConfigError(anyhow::anyhow!("{}: {}", name, e)))
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "test" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
