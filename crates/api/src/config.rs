//! Server configuration.
//!
//! Values come from, lowest to highest precedence: built-in defaults, an
//! optional TOML file, environment variables, command-line flags.
//!
//! # Security
//!
//! - Config files must be regular, non world-writable files (Unix)
//! - A file holding an API key must not be world-readable
//! - Keys are better supplied through `OPENAI_API_KEY`

use concierge_llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use tracing::warn;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_PORT: &str = "APP_PORT";
pub const ENV_BIND: &str = "CONCIERGE_BIND_ADDR";

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConciergeConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8080
}

fn default_max_body_bytes() -> usize {
    crate::state::DEFAULT_BODY_LIMIT
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ConciergeConfig {
    /// Load configuration from a TOML file, validating its permissions first
    /// on Unix.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = read_config_file(path)?;
        let config: Self = toml::from_str(&content)?;

        if config.llm.api_key.is_some() {
            warn!(
                "API key found in config file '{}'. For better security, \
                 use the {} environment variable instead.",
                path.display(),
                ENV_API_KEY
            );
        }

        Ok(config)
    }

    /// Apply environment overrides from the process environment.
    pub fn with_env(self) -> anyhow::Result<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// The API key from the environment only fills a key the file left
    /// unset; the other variables always win over the file.
    pub fn with_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if self.llm.api_key().is_none() {
            self.llm.api_key = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty());
        }

        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            self.llm.api_url = Some(url);
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid {ENV_PORT} '{port}': {e}"))?;
        }

        if let Some(bind) = lookup(ENV_BIND).filter(|b| !b.trim().is_empty()) {
            self.server.bind = bind;
        }

        Ok(self)
    }

    /// The socket address the server should bind.
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .server
            .bind
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {e}", self.server.bind))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

/// Read a config file after validating its permissions.
///
/// - File must be a regular file (not symlink, directory, etc.)
/// - File must not be world-writable
/// - If the file holds an API key, it must not be world-readable
#[cfg(unix)]
fn read_config_file(path: &Path) -> anyhow::Result<String> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!(
            "Config path '{}' is not a regular file. Symlinks and directories are not allowed.",
            path.display()
        );
    }

    let permission_bits = metadata.permissions().mode() & 0o777;

    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if content.contains("api_key") && permission_bits & 0o004 != 0 {
        anyhow::bail!(
            "Config file '{}' contains an API key but is world-readable (mode {:04o}). \
             Fix with: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(content)
}

#[cfg(not(unix))]
fn read_config_file(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn write_config(content: &str, mode: u32) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(mode)).unwrap();
        }
        #[cfg(not(unix))]
        let _ = mode;
        file
    }

    #[test]
    fn defaults() {
        let config = ConciergeConfig::default();
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert!(!config.llm.is_enabled());
        assert_eq!(config.socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config: ConciergeConfig = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.model, "gpt-3.5-turbo");
    }

    #[test]
    fn load_from_file() {
        let file = write_config(
            r#"
[server]
bind = "0.0.0.0"
port = 9000

[llm]
model = "gpt-4o-mini"
"#,
            0o644,
        );

        let config = ConciergeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[cfg(unix)]
    #[test]
    fn world_writable_file_rejected() {
        let file = write_config("[server]\nport = 9000\n", 0o666);
        assert!(ConciergeConfig::from_file(file.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn world_readable_key_rejected() {
        let file = write_config("[llm]\napi_key = \"sk-secret\"\n", 0o644);
        assert!(ConciergeConfig::from_file(file.path()).is_err());

        let file = write_config("[llm]\napi_key = \"sk-secret\"\n", 0o600);
        let config = ConciergeConfig::from_file(file.path()).unwrap();
        assert_eq!(config.llm.api_key(), Some("sk-secret"));
    }

    #[test]
    fn env_overrides() {
        let config = ConciergeConfig::default()
            .with_env_from(env(&[
                (ENV_API_KEY, "sk-env"),
                (ENV_PORT, "3000"),
                (ENV_BIND, "0.0.0.0"),
                (ENV_BASE_URL, "http://localhost:11434"),
            ]))
            .unwrap();

        assert_eq!(config.llm.api_key(), Some("sk-env"));
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.bind, "0.0.0.0");
        assert_eq!(config.llm.api_url.as_deref(), Some("http://localhost:11434"));
    }

    #[test]
    fn file_key_beats_env_key() {
        let mut config = ConciergeConfig::default();
        config.llm.api_key = Some("sk-file".to_string());

        let config = config
            .with_env_from(env(&[(ENV_API_KEY, "sk-env")]))
            .unwrap();
        assert_eq!(config.llm.api_key(), Some("sk-file"));
    }

    #[test]
    fn blank_env_key_stays_disabled() {
        let config = ConciergeConfig::default()
            .with_env_from(env(&[(ENV_API_KEY, "  ")]))
            .unwrap();
        assert!(!config.llm.is_enabled());
    }

    #[test]
    fn invalid_port_is_an_error() {
        let result = ConciergeConfig::default().with_env_from(env(&[(ENV_PORT, "eighty")]));
        assert!(result.is_err());
    }

    #[test]
    fn ipv6_bind_address() {
        let mut config = ConciergeConfig::default();
        config.server.bind = "::1".to_string();
        config.server.port = 9000;

        let addr = config.socket_addr().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.to_string(), "[::1]:9000");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConciergeConfig::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"), "{err}");
    }

    #[cfg(unix)]
    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConciergeConfig::from_file(dir.path()).unwrap_err();
        assert!(err.to_string().contains("not a regular file"), "{err}");
    }

    #[test]
    fn invalid_bind_is_an_error() {
        let mut config = ConciergeConfig::default();
        config.server.bind = "not an address".to_string();
        assert!(config.socket_addr().is_err());
    }
}
