//! Application configuration for LegalWatch.
//!
//! User config lives at `~/.legalwatch/legalwatch.toml`.
//! CLI flags override config file values, which override defaults.
//! Secrets never live in the file, only the names of the env vars holding them.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LegalWatchError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "legalwatch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".legalwatch";

// ---------------------------------------------------------------------------
// Config structs (matching legalwatch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// NER model server.
    #[serde(default)]
    pub ner: NerConfig,

    /// Report generation settings shared by all providers.
    #[serde(default)]
    pub completion: CompletionConfig,

    /// YandexGPT provider.
    #[serde(default)]
    pub yandex: YandexConfig,

    /// GigaChat provider.
    #[serde(default)]
    pub gigachat: GigaChatConfig,

    /// Local Ollama provider.
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// HTTP API server.
    #[serde(default)]
    pub server: ServerConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path to the libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,

    /// Where the latest report is written (overwritten on every run).
    #[serde(default = "default_report_path")]
    pub report_path: String,

    /// RSS 2.0 feed to ingest.
    #[serde(default = "default_feed_url")]
    pub feed_url: String,

    /// Timeout for feed requests.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            report_path: default_report_path(),
            feed_url: default_feed_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_db_path() -> String {
    "laws.db".into()
}
fn default_report_path() -> String {
    "law_report.txt".into()
}
fn default_feed_url() -> String {
    "https://www.consultant.ru/rss/hotdocs.xml".into()
}
fn default_request_timeout() -> u64 {
    30
}

/// `[ner]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NerConfig {
    /// DeepPavlov `riseapi` model endpoint.
    #[serde(default = "default_ner_url")]
    pub url: String,

    /// Per-request timeout.
    #[serde(default = "default_ner_timeout")]
    pub timeout_secs: u64,
}

impl Default for NerConfig {
    fn default() -> Self {
        Self {
            url: default_ner_url(),
            timeout_secs: default_ner_timeout(),
        }
    }
}

fn default_ner_url() -> String {
    "http://localhost:5000/model".into()
}
fn default_ner_timeout() -> u64 {
    60
}

/// `[completion]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Provider names in fallback order.
    #[serde(default = "default_providers")]
    pub providers: Vec<String>,

    /// Completion length budget.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; kept low for consistent summaries.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-request timeout for every provider.
    #[serde(default = "default_completion_timeout")]
    pub timeout_secs: u64,

    /// System instruction sent with every prompt.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            providers: default_providers(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_completion_timeout(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_providers() -> Vec<String> {
    vec!["yandex".into(), "gigachat".into()]
}
fn default_max_tokens() -> u32 {
    500
}
fn default_temperature() -> f32 {
    0.2
}
fn default_completion_timeout() -> u64 {
    60
}
fn default_system_prompt() -> String {
    "Ты - российский юрист. Ты отвечаешь только на русском.".into()
}

/// `[yandex]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YandexConfig {
    #[serde(default = "default_yandex_url")]
    pub url: String,

    #[serde(default = "default_yandex_model_uri")]
    pub model_uri: String,

    /// Name of the env var holding the API key.
    #[serde(default = "default_yandex_key_env")]
    pub api_key_env: String,
}

impl Default for YandexConfig {
    fn default() -> Self {
        Self {
            url: default_yandex_url(),
            model_uri: default_yandex_model_uri(),
            api_key_env: default_yandex_key_env(),
        }
    }
}

fn default_yandex_url() -> String {
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion".into()
}
fn default_yandex_model_uri() -> String {
    "gpt://foundationModels/yandexgpt/latest".into()
}
fn default_yandex_key_env() -> String {
    "YANDEX_API_KEY".into()
}

/// `[gigachat]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GigaChatConfig {
    #[serde(default = "default_gigachat_url")]
    pub url: String,

    #[serde(default = "default_gigachat_model")]
    pub model: String,

    /// Name of the env var holding the bearer token.
    #[serde(default = "default_gigachat_token_env")]
    pub token_env: String,
}

impl Default for GigaChatConfig {
    fn default() -> Self {
        Self {
            url: default_gigachat_url(),
            model: default_gigachat_model(),
            token_env: default_gigachat_token_env(),
        }
    }
}

fn default_gigachat_url() -> String {
    "https://gigachat.devices.sberbank.ru/api/v1/chat/completions".into()
}
fn default_gigachat_model() -> String {
    "GigaChat".into()
}
fn default_gigachat_token_env() -> String {
    "GIGACHAT_API_KEY".into()
}

/// `[ollama]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server.
    #[serde(default = "default_ollama_url")]
    pub url: String,

    #[serde(default = "default_ollama_model")]
    pub model: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            url: default_ollama_url(),
            model: default_ollama_model(),
        }
    }
}

fn default_ollama_url() -> String {
    "http://localhost:11434".into()
}
fn default_ollama_model() -> String {
    "mistral:7b".into()
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP API binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Origins allowed by CORS.
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8000".into()
}
fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".into(),
        "http://127.0.0.1:5173".into(),
    ]
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.legalwatch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LegalWatchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.legalwatch/legalwatch.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| LegalWatchError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        LegalWatchError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| LegalWatchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| LegalWatchError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LegalWatchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Provider names accepted in `completion.providers`.
pub const KNOWN_PROVIDERS: &[&str] = &["yandex", "gigachat", "ollama"];

impl AppConfig {
    /// Reject configs the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.completion.providers.is_empty() {
            return Err(LegalWatchError::config(
                "completion.providers must name at least one provider",
            ));
        }
        for name in &self.completion.providers {
            if !KNOWN_PROVIDERS.contains(&name.as_str()) {
                return Err(LegalWatchError::config(format!(
                    "unknown provider '{name}' in completion.providers (expected one of: {})",
                    KNOWN_PROVIDERS.join(", ")
                )));
            }
        }
        if self.completion.timeout_secs == 0
            || self.ner.timeout_secs == 0
            || self.defaults.request_timeout_secs == 0
        {
            return Err(LegalWatchError::config("timeouts must be greater than zero"));
        }
        Ok(())
    }
}

/// Read a secret from the named env var. Unset and empty are both `None`.
pub fn read_secret(var_name: &str) -> Option<String> {
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Some(val),
        _ => None,
    }
}
