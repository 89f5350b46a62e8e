use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

/// Where the bridge lives and how to talk to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Numeric address of the bridge.
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Host the panel is considered to be opened from. When this is
    /// `localhost`, requests go to `localhost` instead of `address`.
    #[serde(default)]
    pub origin_host: Option<String>,
    /// Address file generated by the bridge at startup
    /// (`const ip_address = '<ip>';`). Takes priority over `address`.
    #[serde(default)]
    pub address_file: Option<PathBuf>,
    /// Per-request timeout.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Column budget of the pseudo-LCD.
    #[serde(default = "default_max_len")]
    pub max_len: usize,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            origin_host: None,
            address_file: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_len: default_max_len(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    platform::DEFAULT_BACKEND_PORT
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_max_len() -> usize {
    crate::display::DEFAULT_MAX_LEN
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl BackendConfig {
    /// The bridge address, preferring the generated address file when one is
    /// configured and readable.
    pub fn resolve_address(&self) -> String {
        if let Some(path) = self.address_file.as_deref() {
            match read_address_file(path) {
                Ok(Some(addr)) => return addr,
                Ok(None) => {
                    tracing::warn!("no ip_address found in {}", path.display());
                }
                Err(e) => {
                    tracing::warn!("failed to read address file {}: {}", path.display(), e);
                }
            }
        }
        self.address.clone()
    }

    pub fn base_url(&self) -> String {
        backend_url(
            &self.resolve_address(),
            self.port,
            self.origin_host.as_deref(),
        )
    }
}

/// Build the control endpoint URL. A panel opened from `localhost` talks to
/// `localhost` on the same port rather than to the numeric address.
pub fn backend_url(address: &str, port: u16, origin_host: Option<&str>) -> String {
    match origin_host {
        Some(host) if host.eq_ignore_ascii_case("localhost") => {
            format!("http://localhost:{}", port)
        }
        _ => format!("http://{}:{}", address, port),
    }
}

/// Extract the address from a generated script such as
/// `const ip_address = '192.168.1.20';`.
pub fn parse_address_script(content: &str) -> Option<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.starts_with("//"))
        .filter_map(|l| {
            let (lhs, rhs) = l.split_once('=')?;
            if !lhs.split_whitespace().any(|tok| tok == "ip_address") {
                return None;
            }
            let rhs = rhs.trim().trim_end_matches(';').trim();
            let unquoted = rhs.trim_matches(|c| c == '\'' || c == '"');
            (!unquoted.is_empty()).then(|| unquoted.to_string())
        })
        .next()
}

pub fn read_address_file(path: &Path) -> anyhow::Result<Option<String>> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_address_script(&content))
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save_to(&config_path)?;
            return Ok(config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
