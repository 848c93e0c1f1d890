//! Application configuration for the prospect brief generator.
//!
//! User config lives at `~/.prospectbrief/prospectbrief.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BriefError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "prospectbrief.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".prospectbrief";

// ---------------------------------------------------------------------------
// Config structs (matching prospectbrief.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Input/output locations and pacing.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Generation service settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Artifact rendering settings.
    #[serde(default)]
    pub render: RenderConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory briefs are written into.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Roster CSV with a `company_name` column.
    #[serde(default = "default_accounts_file")]
    pub accounts_file: String,

    /// Case study CSV.
    #[serde(default = "default_cases_file")]
    pub cases_file: String,

    /// Seconds to pause between generation calls.
    #[serde(default = "default_rate_limit_secs")]
    pub rate_limit_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            accounts_file: default_accounts_file(),
            cases_file: default_cases_file(),
            rate_limit_secs: default_rate_limit_secs(),
        }
    }
}

fn default_output_dir() -> String {
    "output".into()
}
fn default_accounts_file() -> String {
    "accounts.csv".into()
}
fn default_cases_file() -> String {
    "cases.csv".into()
}
fn default_rate_limit_secs() -> u64 {
    15
}

/// `[anthropic]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for every stage.
    #[serde(default = "default_model")]
    pub model: String,

    /// API origin; `/v1/messages` is appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Value of the `anthropic-version` header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_base_url(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "ANTHROPIC_API_KEY".into()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_base_url() -> String {
    "https://api.anthropic.com".into()
}
fn default_api_version() -> String {
    "2023-06-01".into()
}
fn default_timeout_secs() -> u64 {
    120
}

/// `[render]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Attempt the PDF artifact alongside the Markdown one.
    #[serde(default = "default_true")]
    pub pdf: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { pdf: true }
    }
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Runtime settings (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Resolved client settings handed to the generation client.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: Url,
    pub api_version: String,
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Resolve the API key from the environment and parse the base URL.
    pub fn resolve(&self) -> Result<ClientSettings> {
        let api_key = read_api_key(&self.api_key_env)?;
        let base_url = Url::parse(&self.base_url).map_err(|e| {
            BriefError::config(format!("invalid base_url '{}': {e}", self.base_url))
        })?;

        Ok(ClientSettings {
            api_key,
            model: self.model.clone(),
            base_url,
            api_version: self.api_version.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.prospectbrief/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| BriefError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.prospectbrief/prospectbrief.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| BriefError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| BriefError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| BriefError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| BriefError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| BriefError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    read_api_key(&config.anthropic.api_key_env).map(|_| ())
}

fn read_api_key(var_name: &str) -> Result<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(val),
        _ => Err(BriefError::config(format!(
            "Anthropic API key not found. Set the {var_name} environment variable."
        ))),
    }
}
