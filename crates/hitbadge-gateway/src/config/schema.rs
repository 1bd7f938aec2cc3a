use serde::Deserialize;
use hitbadge_core::error::{HitBadgeError, Result};
use hitbadge_core::svg::Escaping;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub badge: BadgeSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            store: StoreSection::default(),
            badge: BadgeSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(HitBadgeError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.store.validate()?;
        self.badge.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Extra ports tried (listen port + 1, + 2, ...) when the address is taken.
    #[serde(default = "default_port_fallback_attempts")]
    pub port_fallback_attempts: u16,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            port_fallback_attempts: default_port_fallback_attempts(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        if self.listen.parse::<std::net::SocketAddr>().is_err() {
            return Err(HitBadgeError::BadRequest(
                "gateway.listen must be a valid SocketAddr".into(),
            ));
        }
        if self.port_fallback_attempts > 100 {
            return Err(HitBadgeError::BadRequest(
                "gateway.port_fallback_attempts must be at most 100".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:5000".into()
}
fn default_port_fallback_attempts() -> u16 {
    10
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_uri")]
    pub uri: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_response_timeout_ms")]
    pub response_timeout_ms: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,

    #[serde(default = "default_health_interval_ms")]
    pub health_interval_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            uri: default_uri(),
            connect_timeout_ms: default_connect_timeout_ms(),
            response_timeout_ms: default_response_timeout_ms(),
            max_retries: default_max_retries(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
            health_interval_ms: default_health_interval_ms(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Redis && self.uri.trim().is_empty() {
            return Err(HitBadgeError::BadRequest("store.uri must not be empty".into()));
        }
        if !(100..=60000).contains(&self.connect_timeout_ms) {
            return Err(HitBadgeError::BadRequest(
                "store.connect_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        if !(50..=30000).contains(&self.response_timeout_ms) {
            return Err(HitBadgeError::BadRequest(
                "store.response_timeout_ms must be between 50 and 30000".into(),
            ));
        }
        if self.max_retries > 10 {
            return Err(HitBadgeError::BadRequest(
                "store.max_retries must be at most 10".into(),
            ));
        }
        if !(1000..=300000).contains(&self.health_interval_ms) {
            return Err(HitBadgeError::BadRequest(
                "store.health_interval_ms must be between 1000 and 300000".into(),
            ));
        }
        Ok(())
    }
}

fn default_uri() -> String {
    "redis://localhost:6379".into()
}
fn default_connect_timeout_ms() -> u64 {
    5000
}
fn default_response_timeout_ms() -> u64 {
    2000
}
fn default_max_retries() -> usize {
    3
}
fn default_retry_max_delay_ms() -> u64 {
    2000
}
fn default_health_interval_ms() -> u64 {
    5000
}

/// What to show when the counter store cannot answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Plausible random counts (daily in [0,100), total in [0,1000)).
    #[default]
    Random,
    /// Render 0/0.
    Zero,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BadgeSection {
    #[serde(default = "default_keep_max_age_secs")]
    pub keep_max_age_secs: u32,

    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// Add `X-Hit-Counter-Degraded: 1` when fallback counts were used.
    #[serde(default)]
    pub degraded_header: bool,

    #[serde(default)]
    pub escape: Escaping,
}

impl Default for BadgeSection {
    fn default() -> Self {
        Self {
            keep_max_age_secs: default_keep_max_age_secs(),
            fallback: FallbackPolicy::default(),
            degraded_header: false,
            escape: Escaping::default(),
        }
    }
}

impl BadgeSection {
    pub fn validate(&self) -> Result<()> {
        if self.keep_max_age_secs > 86400 {
            return Err(HitBadgeError::BadRequest(
                "badge.keep_max_age_secs must be at most 86400".into(),
            ));
        }
        Ok(())
    }
}

fn default_keep_max_age_secs() -> u32 {
    60
}
