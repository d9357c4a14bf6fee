use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_IMAGE_ENDPOINT: &str = "https://image.pollinations.ai/prompt";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Last model the user picked, preferred over the automatic choice
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_preferred_families")]
    pub preferred_families: Vec<String>,
    #[serde(default = "default_expand_temperature")]
    pub expand_temperature: f32,
    #[serde(default = "default_regenerate_temperature")]
    pub regenerate_temperature: f32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_image_endpoint")]
    pub image_endpoint: String,
    #[serde(default = "default_quiz_seconds")]
    pub quiz_seconds: u32,
    #[serde(default = "default_quiz_tick_millis")]
    pub quiz_tick_millis: u64,
    #[serde(default = "default_suggested_topics")]
    pub suggested_topics: Vec<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_preferred_families() -> Vec<String> {
    ["llama3", "mistral", "gpt"].iter().map(|s| s.to_string()).collect()
}

fn default_expand_temperature() -> f32 {
    0.5
}

fn default_regenerate_temperature() -> f32 {
    0.7
}

fn default_request_timeout_secs() -> u64 {
    300 // long generations
}

fn default_image_endpoint() -> String {
    DEFAULT_IMAGE_ENDPOINT.to_string()
}

fn default_quiz_seconds() -> u32 {
    30
}

fn default_quiz_tick_millis() -> u64 {
    1000
}

fn default_suggested_topics() -> Vec<String> {
    [
        "Quantum Computing",
        "The Roman Empire",
        "Neural Networks",
        "Black Holes",
        "Stoicism",
        "CRISPR Gene Editing",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: None,
            preferred_families: default_preferred_families(),
            expand_temperature: default_expand_temperature(),
            regenerate_temperature: default_regenerate_temperature(),
            request_timeout_secs: default_request_timeout_secs(),
            image_endpoint: default_image_endpoint(),
            quiz_seconds: default_quiz_seconds(),
            quiz_tick_millis: default_quiz_tick_millis(),
            suggested_topics: default_suggested_topics(),
        }
    }
}

impl Config {
    /// Period of the quiz countdown, never shorter than a millisecond
    pub fn quiz_tick_period(&self) -> Duration {
        Duration::from_millis(self.quiz_tick_millis.max(1))
    }

    /// Seconds allowed per question; a zero budget still times out
    pub fn quiz_budget(&self) -> u32 {
        self.quiz_seconds.max(1)
    }
}

pub fn get_app_data_dir() -> Result<PathBuf, ConfigError> {
    let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join("OmniWeb");

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir)?;
    }

    Ok(data_dir)
}

fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(get_app_data_dir()?.join("config.json"))
}

/// Read a config file, falling back to defaults when it does not exist
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    tracing::debug!("Saved config to {}", path.display());
    Ok(())
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    save_config_to(&get_config_path()?, config)
}

/// Apply `change` to the stored config and write it back
pub fn update_config_at<F>(path: &Path, change: F) -> Result<Config, ConfigError>
where
    F: FnOnce(&mut Config),
{
    let mut config = match load_config_from(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring unreadable config at {}: {}", path.display(), e);
            Config::default()
        }
    };
    change(&mut config);
    save_config_to(path, &config)?;
    Ok(config)
}

pub fn update_config<F>(change: F) -> Result<Config, ConfigError>
where
    F: FnOnce(&mut Config),
{
    update_config_at(&get_config_path()?, change)
}
