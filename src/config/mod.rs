use std::env;
use std::fmt;
use std::str::FromStr;

use crate::cache::DEFAULT_MAX_LIST_LEN;
use crate::insights::fees::FEES_OVERVIEW_REVENUE_SHARE;

const DEFAULT_LLAMA_API: &str = "https://api.llama.fi";
const DEFAULT_LLAMA_COINS_API: &str = "https://coins.llama.fi";
const DEFAULT_LIDO_API: &str = "https://eth-api.lido.fi";
const DEFAULT_LIDO_WQ_API: &str = "https://wq-api.lido.fi";
const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";

/// Longest accepted cache TTL, one year.
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Where cache entries live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Redis,
    Firestore,
    Memory,
}

impl FromStr for CacheBackendKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "firestore" | "firebase" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            other => Err(anyhow::anyhow!("unknown CACHE_BACKEND: {other}")),
        }
    }
}

impl fmt::Display for CacheBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redis => f.write_str("redis"),
            Self::Firestore => f.write_str("firestore"),
            Self::Memory => f.write_str("memory"),
        }
    }
}

/// Firebase project credentials. Only `project_id` is required to talk to
/// Firestore over REST; the rest are carried for parity with the web config.
#[derive(Debug, Clone, Default)]
pub struct FirebaseConfig {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: String,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
    pub measurement_id: Option<String>,
}

impl FirebaseConfig {
    /// Reads `FIREBASE_*`, falling back to `NEXT_PUBLIC_FIREBASE_*`.
    /// Returns `None` when no project id is set.
    pub fn from_env() -> Option<Self> {
        let project_id = firebase_var("PROJECT_ID")?;
        Some(Self {
            api_key: firebase_var("API_KEY"),
            auth_domain: firebase_var("AUTH_DOMAIN"),
            project_id,
            storage_bucket: firebase_var("STORAGE_BUCKET"),
            messaging_sender_id: firebase_var("MESSAGING_SENDER_ID"),
            app_id: firebase_var("APP_ID"),
            measurement_id: firebase_var("MEASUREMENT_ID"),
        })
    }
}

fn firebase_var(suffix: &str) -> Option<String> {
    env::var(format!("FIREBASE_{suffix}"))
        .or_else(|_| env::var(format!("NEXT_PUBLIC_FIREBASE_{suffix}")))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub redis_url: String,

    // Cache
    pub cache_backend: CacheBackendKind,
    pub cache_ttl_secs: u64,
    pub document_cache_ttl_secs: u64,

    // Upstream APIs
    pub llama_api_url: String,
    pub llama_coins_url: String,
    pub lido_api_url: String,
    pub lido_wq_api_url: String,

    // Document database
    pub firebase: Option<FirebaseConfig>,
    pub firestore_url: Option<String>,
    pub data_collection: String,

    // Business rules
    pub revenue_share: f64,
    pub analytics_events_key: String,
    pub analytics_max_events: usize,

    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3001,
            redis_url: "redis://localhost:6379".into(),
            cache_backend: CacheBackendKind::Redis,
            cache_ttl_secs: 300,
            document_cache_ttl_secs: 3600,
            llama_api_url: DEFAULT_LLAMA_API.into(),
            llama_coins_url: DEFAULT_LLAMA_COINS_API.into(),
            lido_api_url: DEFAULT_LIDO_API.into(),
            lido_wq_api_url: DEFAULT_LIDO_WQ_API.into(),
            firebase: None,
            firestore_url: None,
            data_collection: "test".into(),
            revenue_share: FEES_OVERVIEW_REVENUE_SHARE,
            analytics_events_key: "analytics-events".into(),
            analytics_max_events: DEFAULT_MAX_LIST_LEN,
            log_json: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment. `default_port` is the
    /// service's own port when `PORT` is unset.
    pub fn from_env(default_port: u16) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let firestore_url = env::var("FIRESTORE_URL").ok().or_else(|| {
            env::var("FIRESTORE_EMULATOR_HOST")
                .ok()
                .map(|host| format!("http://{host}/v1"))
        });

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", default_port)?,
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),

            cache_backend: env::var("CACHE_BACKEND")
                .unwrap_or_else(|_| "redis".into())
                .parse()?,
            cache_ttl_secs: checked_ttl(
                "CACHE_TTL_SECS",
                parse_var("CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            )?,
            document_cache_ttl_secs: checked_ttl(
                "DOCUMENT_CACHE_TTL_SECS",
                parse_var("DOCUMENT_CACHE_TTL_SECS", defaults.document_cache_ttl_secs)?,
            )?,

            llama_api_url: env::var("DEFILLAMA_API_URL").unwrap_or(defaults.llama_api_url),
            llama_coins_url: env::var("DEFILLAMA_COINS_URL").unwrap_or(defaults.llama_coins_url),
            lido_api_url: env::var("LIDO_API_URL").unwrap_or(defaults.lido_api_url),
            lido_wq_api_url: env::var("LIDO_WQ_API_URL").unwrap_or(defaults.lido_wq_api_url),

            firebase: FirebaseConfig::from_env(),
            firestore_url,
            data_collection: env::var("DATA_COLLECTION").unwrap_or(defaults.data_collection),

            revenue_share: checked_share(
                "REVENUE_SHARE",
                parse_var("REVENUE_SHARE", defaults.revenue_share)?,
            )?,
            analytics_events_key: env::var("ANALYTICS_EVENTS_KEY")
                .unwrap_or(defaults.analytics_events_key),
            analytics_max_events: match parse_var(
                "ANALYTICS_MAX_EVENTS",
                defaults.analytics_max_events,
            )? {
                0 => anyhow::bail!("ANALYTICS_MAX_EVENTS must be at least 1"),
                n => n,
            },

            log_json: env::var("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Firestore REST root for the configured project, e.g.
    /// `https://firestore.googleapis.com/v1/projects/p/databases/(default)/documents`.
    pub fn firestore_base_url(&self) -> Option<String> {
        let firebase = self.firebase.as_ref()?;
        let root = self
            .firestore_url
            .as_deref()
            .unwrap_or(FIRESTORE_API_BASE)
            .trim_end_matches('/');
        Some(format!(
            "{root}/projects/{}/databases/(default)/documents",
            firebase.project_id
        ))
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
{
    parse_raw(name, env::var(name).ok(), default)
}

fn parse_raw<T>(name: &str, raw: Option<String>, default: T) -> anyhow::Result<T>
where
    T: FromStr,
{
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} must be a valid number, got {raw:?}")),
        _ => Ok(default),
    }
}

/// A fraction of fees, finite and within `0..=1`.
fn checked_share(name: &str, value: f64) -> anyhow::Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(anyhow::anyhow!("{name} must be between 0 and 1, got {value}"))
    }
}

fn checked_ttl(name: &str, secs: u64) -> anyhow::Result<u64> {
    if secs > MAX_TTL_SECS {
        anyhow::bail!("{name} must be at most {MAX_TTL_SECS} seconds, got {secs}");
    }
    Ok(secs)
}
