use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub platform: PlatformConfig,
    pub broadcast: BroadcastConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

/// Video platform REST API endpoint and credentials.
#[derive(Debug, Deserialize)]
pub struct PlatformConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,

    /// Per-request timeout. An expired platform call rejects the
    /// in-flight session creation so waiters are released.
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct BroadcastConfig {
    /// NATS server URL
    pub nats_url: String,

    /// Subject prefix for captions signals (one subject per session)
    pub subject_prefix: String,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    /// "memory" for single-instance deployments, "redis" for shared
    /// state across backend instances
    pub backend: String,

    /// Redis URL; required when backend = "redis"
    pub redis_url: Option<String>,

    /// Key namespace for room state
    pub key_prefix: String,

    /// Idle TTL for room entries, refreshed on every read and write
    pub ttl_secs: u64,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
