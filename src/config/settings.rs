//! Application settings and configuration structures.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure containing all application settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server configuration (host, port)
    pub server: ServerSettings,

    /// Database configuration (PostgreSQL)
    pub database: DatabaseSettings,

    /// JWT authentication settings
    pub jwt: JwtSettings,

    /// Page sizes for the feed and per-user listings
    pub pagination: PaginationSettings,

    /// Upload limits
    pub upload: UploadSettings,

    /// Media host (Cloudinary) credentials
    pub media: MediaSettings,

    /// Transactional email (Resend) settings
    pub mail: MailSettings,

    /// CORS configuration
    pub cors: CorsSettings,

    /// Current environment (development, staging, production)
    pub environment: String,
}

/// Server binding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// Host address to bind to (e.g., "0.0.0.0")
    pub host: String,

    /// Port number to listen on
    pub port: u16,
}

/// PostgreSQL database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// Database connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections to maintain
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub acquire_timeout: u64,
}

/// JWT authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    /// Secret key for signing tokens
    pub secret: String,

    /// Token lifetime in hours
    pub token_expiry_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationSettings {
    pub feed_page_size: u32,
    pub user_page_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    /// Largest accepted request body, multipart included
    pub max_body_bytes: usize,
}

/// Cloudinary account used for post files and avatars.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaSettings {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

/// Resend account used for password-reset mail.
#[derive(Debug, Clone, Deserialize)]
pub struct MailSettings {
    pub api_key: String,
    pub from: String,
    pub base_url: String,
    /// Frontend page that consumes `?token=`
    pub reset_url: String,
    pub timeout_secs: u64,
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    /// Allowed origins (comma-separated in env)
    pub allowed_origins: Vec<String>,
}

/// Minimum required length for JWT secret (256 bits = 32 bytes)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

impl Settings {
    /// Load settings from environment variables and configuration files.
    ///
    /// The loading order is:
    /// 1. config/default.toml (base configuration)
    /// 2. config/{RUN_ENV}.toml (environment-specific overrides)
    /// 3. `APP__*` environment variables
    /// 4. Plain deployment variables (`PORT`, `DATABASE_URL`, `DB_*`, `JWT_SECRET`,
    ///    `CLOUDINARY_*`, `RESEND_API_KEY`, ...)
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if configuration cannot be loaded or parsed,
    /// or if JWT secret is too short.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let environment = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());
        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());

        Self::defaults(Config::builder(), &environment)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // APP__SERVER__PORT=8080 -> server.port = 8080
            .add_source(
                Environment::default()
                    .prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.host", env("SERVER_HOST"))?
            .set_override_option("server.port", env("SERVER_PORT").or_else(|| env("PORT")))?
            .set_override_option(
                "database.url",
                env("DATABASE_URL").or_else(|| database_url_from_parts(&env)),
            )?
            .set_override_option("jwt.secret", env("JWT_SECRET"))?
            .set_override_option("media.cloud_name", env("CLOUDINARY_CLOUD_NAME"))?
            .set_override_option("media.api_key", env("CLOUDINARY_API_KEY"))?
            .set_override_option("media.api_secret", env("CLOUDINARY_API_SECRET"))?
            .set_override_option("mail.api_key", env("RESEND_API_KEY"))?
            .set_override_option("mail.from", env("MAIL_FROM"))?
            .set_override_option("mail.reset_url", env("PASSWORD_RESET_URL"))?
            .build()?
            .try_deserialize()
            .and_then(Self::validated)
    }

    fn defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
        environment: &str,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("environment", environment)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("database.acquire_timeout", 30)?
            .set_default("jwt.token_expiry_hours", 24)?
            .set_default("pagination.feed_page_size", 10)?
            .set_default("pagination.user_page_size", 10)?
            .set_default("upload.max_body_bytes", 25 * 1024 * 1024)?
            .set_default("media.cloud_name", "")?
            .set_default("media.api_key", "")?
            .set_default("media.api_secret", "")?
            .set_default("media.base_url", "https://api.cloudinary.com/v1_1")?
            .set_default("media.timeout_secs", 30)?
            .set_default("mail.api_key", "")?
            .set_default("mail.from", "noreply@redapuntes.com")?
            .set_default("mail.base_url", "https://api.resend.com")?
            .set_default("mail.reset_url", "http://localhost:3000/reset-password")?
            .set_default("mail.timeout_secs", 10)?
            .set_default("cors.allowed_origins", vec!["http://localhost:3000"])
    }

    fn validated(settings: Self) -> Result<Self, ConfigError> {
        if settings.jwt.secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::Message(format!(
                "JWT secret must be at least {} characters for security. Current length: {}",
                MIN_JWT_SECRET_LENGTH,
                settings.jwt.secret.len()
            )));
        }
        if settings.pagination.feed_page_size == 0 || settings.pagination.user_page_size == 0 {
            return Err(ConfigError::Message("Page sizes must be positive".into()));
        }
        Ok(settings)
    }

    /// Get the full server address as a string.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Assemble a Postgres URL from the discrete `DB_*` variables, if `DB_HOST` is set.
fn database_url_from_parts(env: &dyn Fn(&str) -> Option<String>) -> Option<String> {
    let host = env("DB_HOST")?;
    let user = env("DB_USER").unwrap_or_else(|| "postgres".into());
    let password = env("DB_PASSWORD").unwrap_or_default();
    let name = env("DB_NAME").unwrap_or_else(|| "red_apuntes".into());
    let port = env("DB_PORT").unwrap_or_else(|| "5432".into());
    let sslmode = env("DB_SSLMODE").unwrap_or_else(|| "disable".into());

    Some(format!(
        "postgres://{}:{}@{}:{}/{}?sslmode={}",
        user, password, host, port, name, sslmode
    ))
}
