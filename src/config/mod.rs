use std::path::PathBuf;
use std::sync::Arc;

use time::macros::{format_description, offset};
use time::UtcOffset;

use crate::errors::WikiError;

/// Application configuration and constants
#[derive(Debug, Clone)]
pub struct Config {
    pub content_root: Arc<PathBuf>,
    pub home_title: String,
    pub utc_offset: UtcOffset,
    pub staff_token: Option<String>,
    pub port: u16,
    pub host: String,
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self {
            content_root: Arc::new(PathBuf::from("pages")),
            home_title: "home".to_string(),
            utc_offset: offset!(+9),
            staff_token: None,
            port: 5004,
            host: "0.0.0.0".to_string(),
        }
    }

    /// Build the configuration from `PALIMPSEST_*` environment variables
    pub fn from_env() -> Result<Self, WikiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, WikiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(root) = lookup("PALIMPSEST_CONTENT_ROOT") {
            config.content_root = Arc::new(PathBuf::from(root));
        }
        if let Some(home) = lookup("PALIMPSEST_HOME") {
            let home = home.trim_matches('/').to_string();
            if home.is_empty() {
                return Err(WikiError::Config("PALIMPSEST_HOME must not be empty".to_string()));
            }
            config.home_title = home;
        }
        if let Some(offset) = lookup("PALIMPSEST_UTC_OFFSET") {
            config.utc_offset = parse_utc_offset(&offset)?;
        }
        if let Some(token) = lookup("PALIMPSEST_STAFF_TOKEN") {
            if !token.is_empty() {
                config.staff_token = Some(token);
            }
        }
        if let Some(host) = lookup("PALIMPSEST_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("PALIMPSEST_PORT") {
            config.port = port
                .parse()
                .map_err(|_| WikiError::Config(format!("invalid port: {}", port)))?;
        }

        Ok(config)
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> Result<std::net::SocketAddr, WikiError> {
        let ip: std::net::IpAddr = self
            .host
            .parse()
            .map_err(|_| WikiError::Config(format!("invalid host: {}", self.host)))?;
        Ok(std::net::SocketAddr::new(ip, self.port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse `+HH:MM` / `-HH:MM`, or `Z` / `UTC`
fn parse_utc_offset(raw: &str) -> Result<UtcOffset, WikiError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(UtcOffset::UTC);
    }
    UtcOffset::parse(raw, format_description!("[offset_hour sign:mandatory]:[offset_minute]"))
        .map_err(|e| WikiError::Config(format!("invalid UTC offset {:?}: {}", raw, e)))
}
