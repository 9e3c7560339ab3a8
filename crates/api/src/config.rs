use axum::http::HeaderValue;
use sentry_assistant::gemini::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
use sentry_assistant::GeminiConfig;
use sentry_core::clock::{ReportClock, DEFAULT_REPORT_TIMEZONE};
use sentry_events::delivery::notify_api::DEFAULT_NOTIFY_API_URL;
use sentry_events::SendFailurePolicy;

use crate::auth::jwt::JwtConfig;

/// Default access token lifetime: one working day.
const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 720;
const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}': {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which persistence backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct AdminBootstrap {
    pub email: String,
    pub password: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret (and the database URL for the Postgres
/// backend) have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<HeaderValue>,
    pub request_timeout_secs: u64,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
    /// Initial admin created at startup when the email is unknown.
    pub admin: Option<AdminBootstrap>,
    pub notify_api_url: String,
    pub notify_api_key: String,
    /// Time zone report schedules are interpreted in.
    pub report_clock: ReportClock,
    pub send_failure_policy: SendFailurePolicy,
    pub scheduler_enabled: bool,
    /// `None` disables the assistant endpoints.
    pub gemini: Option<GeminiConfig>,
    pub max_tool_rounds: usize,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                      | Default                                             |
    /// |------------------------------|-----------------------------------------------------|
    /// | `HOST` / `PORT`              | `0.0.0.0` / `3000`                                  |
    /// | `CORS_ORIGINS`               | `http://localhost:9002`                             |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                                                |
    /// | `STORE_BACKEND`              | `postgres`                                          |
    /// | `DATABASE_URL`               | required for `postgres`                             |
    /// | `JWT_SECRET`                 | required                                            |
    /// | `JWT_ACCESS_EXPIRY_MINS`     | `720`                                               |
    /// | `ADMIN_EMAIL` / `ADMIN_PASSWORD` | unset                                           |
    /// | `NOTIFY_API_URL`             | `https://notify-woi3.onrender.com/api/notify`       |
    /// | `NOTIFY_API_KEY`             | empty                                               |
    /// | `REPORT_TIMEZONE`            | `Africa/Nairobi`                                    |
    /// | `REPORT_SEND_FAILURE_POLICY` | `abort`                                             |
    /// | `REPORT_SCHEDULER_ENABLED`   | `true`                                              |
    /// | `GEMINI_API_KEY`             | unset                                               |
    /// | `GEMINI_MODEL`               | `gemini-2.5-flash`                                  |
    /// | `GEMINI_API_BASE`            | `https://generativelanguage.googleapis.com/v1beta`  |
    /// | `ASSISTANT_MAX_TOOL_ROUNDS`  | `8`                                                 |
    /// | `LOG_FORMAT`                 | `text`                                              |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let cors_origins = env
            .string("CORS_ORIGINS", "http://localhost:9002")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|e| ConfigError::Invalid {
                    var: "CORS_ORIGINS",
                    value: origin.to_string(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let store_backend = match env.string("STORE_BACKEND", "postgres").to_ascii_lowercase().as_str() {
            "postgres" => StoreBackend::Postgres,
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "STORE_BACKEND",
                    value: other.to_string(),
                    reason: "expected postgres or memory".into(),
                })
            }
        };
        let database_url = env.optional("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let jwt = JwtConfig {
            secret: env.optional("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            access_token_expiry_mins: env.parsed("JWT_ACCESS_EXPIRY_MINS", DEFAULT_ACCESS_EXPIRY_MINS)?,
        };

        let admin = match (env.optional("ADMIN_EMAIL"), env.optional("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminBootstrap { email, password }),
            (Some(_), None) => return Err(ConfigError::Missing("ADMIN_PASSWORD")),
            _ => None,
        };

        let report_timezone = env.string("REPORT_TIMEZONE", DEFAULT_REPORT_TIMEZONE);
        let report_clock =
            ReportClock::from_name(&report_timezone).map_err(|e| ConfigError::Invalid {
                var: "REPORT_TIMEZONE",
                value: report_timezone,
                reason: e.to_string(),
            })?;

        let gemini = env.optional("GEMINI_API_KEY").map(|api_key| GeminiConfig {
            api_base: env.string("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            api_key,
            model: env.string("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        });

        let log_format = match env.string("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            host: env.string("HOST", "0.0.0.0"),
            port: env.parsed("PORT", 3000)?,
            cors_origins,
            request_timeout_secs: env.parsed("REQUEST_TIMEOUT_SECS", 30)?,
            store_backend,
            database_url,
            jwt,
            admin,
            notify_api_url: env.string("NOTIFY_API_URL", DEFAULT_NOTIFY_API_URL),
            notify_api_key: env.string("NOTIFY_API_KEY", ""),
            report_clock,
            send_failure_policy: env.parsed("REPORT_SEND_FAILURE_POLICY", SendFailurePolicy::Abort)?,
            scheduler_enabled: env.parsed("REPORT_SCHEDULER_ENABLED", true)?,
            gemini,
            max_tool_rounds: env.parsed("ASSISTANT_MAX_TOOL_ROUNDS", DEFAULT_MAX_TOOL_ROUNDS)?,
            log_format,
        })
    }
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Set and non-blank.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(key) {
            None => Ok(default),
            Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                var: key,
                reason: e.to_string(),
                value,
            }),
        }
    }
}
