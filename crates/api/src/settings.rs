//! Runtime Settings

use serde::Deserialize;

/// Server settings, read from an optional `firewatch.toml` next to the
/// binary with `FIREWATCH_*` environment overrides.
///
/// `jwt_secret` has no default: the signing secret is supplied from
/// outside so it can be rotated without a rebuild.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Listen address
    pub bind_addr: String,
    /// HS256 signing secret for bearer tokens
    pub jwt_secret: String,
    /// Token validity window
    pub token_ttl_minutes: i64,
    /// Push-notification endpoint
    pub notify_url: String,
}

impl Settings {
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("bind_addr", "0.0.0.0:8080")?
            .set_default("token_ttl_minutes", 30)?
            .set_default("notify_url", "https://notify-api.line.me/api/notify")?
            .add_source(config::File::with_name("firewatch").required(false))
            .add_source(config::Environment::with_prefix("FIREWATCH"))
            .build()?
            .try_deserialize()
    }
}
