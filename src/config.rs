use std::env;

use thiserror::Error;

/// Fallback signing secret for local runs. Never accepted in production.
pub const LOCAL_JWT_SECRET: &str = "zip-api-local-development-secret";

/// Default bearer token lifetime: one day.
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 86_400;

/// Upper bound for `TOKEN_TTL_SECONDS`: one year.
pub const MAX_TOKEN_TTL_SECONDS: i64 = 31_536_000;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup,
/// immutable afterwards, and pulled into handlers and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` selects the in-memory store (local only).
    pub db_url: Option<String>,
    // Runtime environment marker. Controls log format and which settings are mandatory.
    pub env: Env,
    // HS256 secret used to sign and verify bearer tokens.
    pub jwt_secret: String,
    // Lifetime of issued bearer tokens, in seconds.
    pub token_ttl_seconds: i64,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Optional login user created at startup.
    pub seed_user: Option<SeedUser>,
}

/// Env
///
/// Runtime context. `Production` demands every secret explicitly.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// Credentials for the login user provisioned at startup.
#[derive(Clone, Debug)]
pub struct SeedUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Default for AppConfig {
    /// Safe values for test state scaffolding; no environment access.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            token_ttl_seconds: DEFAULT_TOKEN_TTL_SECONDS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            seed_user: None,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables. Production refuses to
    /// start without `DATABASE_URL` and `JWT_SECRET`; local runs fall back to the
    /// in-memory store and a development secret.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let db_url = non_empty("DATABASE_URL");
        let jwt_secret = non_empty("JWT_SECRET");

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(db_url.ok_or(ConfigError::Missing("DATABASE_URL"))?),
                jwt_secret.ok_or(ConfigError::Missing("JWT_SECRET"))?,
            ),
            Env::Local => (
                db_url,
                jwt_secret.unwrap_or_else(|| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        let token_ttl_seconds = match non_empty("TOKEN_TTL_SECONDS") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(ttl) if (1..=MAX_TOKEN_TTL_SECONDS).contains(&ttl) => ttl,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TOKEN_TTL_SECONDS",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_TOKEN_TTL_SECONDS,
        };

        let bind_addr = non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let seed_user = match (non_empty("SEED_USER_EMAIL"), non_empty("SEED_USER_PASSWORD")) {
            (Some(email), Some(password)) => Some(SeedUser {
                name: non_empty("SEED_USER_NAME").unwrap_or_else(|| "Administrator".to_string()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            db_url,
            env,
            jwt_secret,
            token_ttl_seconds,
            bind_addr,
            seed_user,
        })
    }
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
