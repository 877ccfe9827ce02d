//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Rate limit requests per second
    pub rate_limit_rps: u32,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// SQLite database URL
    pub database_url: String,
    /// Shared secret for verifying bearer tokens
    pub auth_secret: String,
    /// fal.ai API key
    pub fal_api_key: String,
    /// fal.ai queue base URL
    pub fal_base_url: String,
    /// Public base URL of this service, used to build webhook callbacks
    pub public_base_url: Option<String>,
    /// Provider submission timeout
    pub provider_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            max_body_size: 2 * 1024 * 1024, // 2MB
            environment: "development".to_string(),
            database_url: "sqlite://pixgen.db".to_string(),
            auth_secret: "dev-secret".to_string(),
            fal_api_key: String::new(),
            fal_base_url: "https://queue.fal.run".to_string(),
            public_base_url: None,
            provider_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit_rps),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_body_size),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            auth_secret: std::env::var("AUTH_JWT_SECRET").unwrap_or(defaults.auth_secret),
            fal_api_key: std::env::var("FAL_KEY").unwrap_or(defaults.fal_api_key),
            fal_base_url: std::env::var("FAL_BASE_URL").unwrap_or(defaults.fal_base_url),
            public_base_url: std::env::var("PUBLIC_BASE_URL").ok(),
            provider_timeout: Duration::from_secs(
                std::env::var("PROVIDER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}
