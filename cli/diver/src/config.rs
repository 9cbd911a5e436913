//! Configuration and credential storage.
//!
//! Handles:
//! - UCP and Store endpoint configuration
//! - UCP bearer token storage
//! - Docker Store token and account ID storage

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Configuration file name.
const CONFIG_FILE: &str = "config.json";

/// UCP credentials file name.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Docker Store credentials file name.
const STORE_CREDENTIALS_FILE: &str = "store.json";

const DEFAULT_STORE_URL: &str = "https://store.docker.com/api/billing/v4/subscriptions";

/// Get the config directory path.
fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "diver", "diver")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// UCP endpoint URL.
    #[serde(default = "default_ucp_url")]
    pub ucp_url: String,

    /// Docker Store subscriptions endpoint URL.
    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Accept self-signed UCP certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_ucp_url() -> String {
    std::env::var("DIVER_UCP_URL").unwrap_or_else(|_| "https://localhost".to_string())
}

fn default_store_url() -> String {
    std::env::var("DIVER_STORE_URL").unwrap_or_else(|_| DEFAULT_STORE_URL.to_string())
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ucp_url: default_ucp_url(),
            store_url: default_store_url(),
            insecure: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load config from disk, or return default.
    pub fn load() -> Result<Self> {
        Ok(read_json(&config_dir()?.join(CONFIG_FILE))?.unwrap_or_default())
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        write_private_json(CONFIG_FILE, self)
    }
}

/// Stored UCP credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    /// Bearer token issued by `/auth/login`.
    pub token: String,

    /// Account name the token belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(token: String) -> Self {
        Self {
            token,
            username: None,
        }
    }

    /// Load credentials from disk.
    pub fn load() -> Result<Option<Self>> {
        read_json(&config_dir()?.join(CREDENTIALS_FILE))
    }

    /// Save credentials to disk.
    pub fn save(&self) -> Result<()> {
        write_private_json(CREDENTIALS_FILE, self)
    }

    /// Delete credentials from disk.
    pub fn delete() -> Result<()> {
        let path = config_dir()?.join(CREDENTIALS_FILE);

        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete credentials at {:?}", path))?;
        }

        Ok(())
    }
}

/// Stored Docker Store credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCredentials {
    /// Store JWT.
    pub token: String,

    /// Docker ID whose subscriptions are queried by default.
    pub docker_id: String,
}

impl StoreCredentials {
    /// Load store credentials from disk.
    pub fn load() -> Result<Option<Self>> {
        read_json(&config_dir()?.join(STORE_CREDENTIALS_FILE))
    }

    /// Save store credentials to disk.
    pub fn save(&self) -> Result<()> {
        write_private_json(STORE_CREDENTIALS_FILE, self)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;

    serde_json::from_str(&contents)
        .map(Some)
        .with_context(|| format!("Failed to parse {:?}", path))
}

fn write_private_json<T: Serialize>(file_name: &str, value: &T) -> Result<()> {
    let dir = config_dir()?;
    fs::create_dir_all(&dir)?;

    let path = dir.join(file_name);
    let contents = serde_json::to_string_pretty(value)?;

    // Tokens live in these files; keep them owner-only on Unix
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(&path)
            .with_context(|| format!("Failed to open {:?}", path))?;
        file.write_all(contents.as_bytes())?;
    }

    #[cfg(not(unix))]
    {
        fs::write(&path, contents).with_context(|| format!("Failed to write {:?}", path))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(!config.ucp_url.is_empty());
        assert!(!config.store_url.is_empty());
        assert_eq!(config.timeout_secs, 30);
        assert!(!config.insecure);
    }

    #[test]
    fn test_config_missing_fields_use_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"ucp_url":"https://ucp.example.com"}"#).unwrap();
        assert_eq!(config.ucp_url, "https://ucp.example.com");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_credentials_new() {
        let creds = Credentials::new("test-token".to_string());
        assert_eq!(creds.token, "test-token");
        assert!(creds.username.is_none());

        let json = serde_json::to_string(&creds).unwrap();
        assert!(!json.contains("username"));
    }
}
