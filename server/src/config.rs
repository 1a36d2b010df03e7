//! Runtime configuration for the team service.

use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Postgres DSN; without it the service runs on the in-memory store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub redis_url: String,
    pub server_addr: String,
    /// Redis pub/sub channel carrying `{event_name, data}` envelopes.
    pub events_channel: String,

    pub user_service_url: String,
    pub user_service_api_key: String,
    pub hackathon_service_url: String,
    pub hackathon_service_api_key: String,
    /// Upper bound for a single call to the user / hackathon services.
    pub upstream_timeout: Duration,

    pub s3_endpoint: Option<String>,
    pub s3_bucket: String,
    /// Base URL clients use to reach this service (submission redirect links).
    pub public_api_url: String,
    pub max_upload_bytes: usize,

    pub jwt_secret: String,
    pub internal_api_key: String,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

impl Settings {
    fn from_env() -> Self {
        let upstream_timeout = env::var("UPSTREAM_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);

        let db_max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(5);

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(20 * 1024 * 1024);

        Settings {
            database_url: env::var("DATABASE_URL").ok(),
            db_max_connections,
            redis_url: var_or("REDIS_URL", "redis://127.0.0.1/"),
            server_addr: var_or("SERVER_ADDR", "127.0.0.1:8080"),
            events_channel: var_or("EVENTS_CHANNEL", "events"),
            user_service_url: var_or("USER_SERVICE_URL", "http://127.0.0.1:8001/"),
            user_service_api_key: var_or("USER_SERVICE_API_KEY", ""),
            hackathon_service_url: var_or("HACKATHON_SERVICE_URL", "http://127.0.0.1:8002/"),
            hackathon_service_api_key: var_or("HACKATHON_SERVICE_API_KEY", ""),
            upstream_timeout: Duration::from_secs(upstream_timeout),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_bucket: var_or("S3_BUCKET", "hackathons"),
            public_api_url: var_or("PUBLIC_API_URL", "http://127.0.0.1:8080/"),
            max_upload_bytes,
            jwt_secret: var_or("JWT_SECRET", "dstu"),
            internal_api_key: var_or("INTERNAL_API_KEY", "apikey"),
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
