//! Configuration loading for skaldd.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.skald/config.toml` (user)
//! 3. `/etc/skald/config.toml` (system)
//!
//! Secrets are loaded separately with mandatory permission checks:
//! 1. `~/.skald/secrets.toml` (user, must be 0600)
//! 2. `/etc/skald/secrets.toml` (system, must be 0600)
//!
//! API keys fall back to `GEMINI_API_KEY` / `CAST_API_KEY` environment
//! variables when no secrets file provides them.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{Result, SkaldError};

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheSection,
    #[serde(default)]
    pub rate_limit: RateLimitSection,
    #[serde(default)]
    pub retry: RetrySection,
}

/// Server network configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8787).
    #[serde(default = "default_address")]
    pub address: String,
    /// Public base URL embedded in frame image and post-back URLs
    /// (default: http://localhost:8787).
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Default translation target language (default: "vi").
    #[serde(default = "default_target_lang")]
    pub target_lang: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            public_url: default_public_url(),
            target_lang: default_target_lang(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_public_url() -> String {
    "http://localhost:8787".to_string()
}

fn default_target_lang() -> String {
    "vi".to_string()
}

/// Upstream API configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub casts: CastsConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Content-API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CastsConfig {
    /// Base URL (default: https://api.neynar.com/v2).
    #[serde(default = "default_casts_url")]
    pub base_url: String,
}

impl Default for CastsConfig {
    fn default() -> Self {
        Self {
            base_url: default_casts_url(),
        }
    }
}

fn default_casts_url() -> String {
    "https://api.neynar.com/v2".to_string()
}

/// Generative-language API configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// Base URL (default: https://generativelanguage.googleapis.com).
    #[serde(default = "default_gemini_url")]
    pub base_url: String,
    /// Model name (default: gemini-1.5-flash).
    #[serde(default = "default_model")]
    pub model: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_url(),
            model: default_model(),
        }
    }
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

/// Result-cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    /// Disable to degrade to the no-op cache (default: true).
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Maximum number of cached entries (default: 10,000).
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_max_entries(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> u64 {
    10_000
}

/// Frame rate-limiter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitSection {
    /// Maximum requests per key per window (default: 20).
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Window length in seconds (default: 60).
    #[serde(default = "default_window")]
    pub window_secs: u64,
}

impl Default for RateLimitSection {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            window_secs: default_window(),
        }
    }
}

fn default_limit() -> u32 {
    20
}

fn default_window() -> u64 {
    60
}

/// Model-call retry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrySection {
    /// Maximum attempts including the initial request (default: 5).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay in seconds; attempt n waits base × n (default: 3).
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: u64,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay(),
        }
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay() -> u64 {
    3
}

/// Secrets configuration (API keys).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub gemini: Option<ApiKeySecret>,
    #[serde(default)]
    pub casts: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

/// Upstream name → environment variable name mapping.
const PROVIDER_ENV_VARS: &[(&str, &str)] =
    &[("gemini", "GEMINI_API_KEY"), ("casts", "CAST_API_KEY")];

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.skald/config.toml`
    /// 3. `/etc/skald/config.toml`
    ///
    /// Runs on defaults when no file exists anywhere.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let Some(path) = Self::resolve_config_path(explicit_path)? else {
            return Ok(Self::default());
        };
        let content = fs::read_to_string(&path).map_err(|e| {
            SkaldError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            SkaldError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Resolve the config file path. `Ok(None)` means no file anywhere
    /// and none explicitly requested.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(SkaldError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".skald").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/skald/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}

impl Secrets {
    /// Load secrets from the standard locations with permission checks.
    ///
    /// Resolution order:
    /// 1. `~/.skald/secrets.toml` (if exists, must be 0600)
    /// 2. `/etc/skald/secrets.toml` (if exists, must be 0600)
    ///
    /// Returns empty secrets if no file exists (keys may come from env vars).
    pub fn load() -> Result<Self> {
        // Try user secrets first
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".skald").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        // Try system secrets
        let system_secrets = PathBuf::from("/etc/skald/secrets.toml");
        if system_secrets.exists() {
            Self::check_permissions(&system_secrets)?;
            return Self::load_from_file(&system_secrets);
        }

        // No secrets file — return empty (keys can fall back to env vars)
        Ok(Secrets::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SkaldError::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            SkaldError::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            SkaldError::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(SkaldError::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        // Permission check not available on non-Unix platforms
        Ok(())
    }

    /// Get the API key for an upstream, falling back to the corresponding
    /// environment variable.
    pub fn api_key(&self, provider: &str) -> Option<String> {
        // Try secrets file first
        let from_file = match provider {
            "gemini" => self.gemini.as_ref(),
            "casts" => self.casts.as_ref(),
            _ => None,
        }
        .map(|s| s.api_key.clone());

        // Fall back to env var
        from_file.or_else(|| {
            PROVIDER_ENV_VARS
                .iter()
                .find(|(name, _)| *name == provider)
                .and_then(|(_, env_var)| std::env::var(env_var).ok())
        })
    }
}
