//! Tests for configuration layering.

use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use webscout::agent_loop::LoopConfig;
use webscout::config::{ScoutConfig, DEFAULT_FETCH_TIMEOUT};
use webscout::error::ScoutError;
use webscout::models::OpenAiModel;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 6] = [
    "OPENAI_API_KEY",
    "OPENAI_BASE_URL",
    "WEBSCOUT_SEARCH_BASE_URL",
    "WEBSCOUT_MODEL",
    "WEBSCOUT_MAX_ITERATIONS",
    "WEBSCOUT_FETCH_TIMEOUT_SECS",
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn clean_env() -> EnvGuard {
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    guard
}

#[test]
fn env_supplies_key_model_and_limits() {
    let _lock = env_lock_guard();
    let _env = clean_env();
    std::env::set_var("OPENAI_API_KEY", "sk-env");
    std::env::set_var("WEBSCOUT_MODEL", "gpt-3.5-turbo");
    std::env::set_var("WEBSCOUT_MAX_ITERATIONS", "8");
    std::env::set_var("WEBSCOUT_FETCH_TIMEOUT_SECS", "3");

    let config = ScoutConfig::from_env();

    assert_eq!(config.require_api_key().unwrap(), "sk-env");
    assert_eq!(config.model, OpenAiModel::Gpt35Turbo);
    assert_eq!(config.max_iterations, 8);
    assert_eq!(config.fetch_timeout, Duration::from_secs(3));
}

#[test]
fn malformed_numeric_env_is_ignored() {
    let _lock = env_lock_guard();
    let _env = clean_env();
    std::env::set_var("WEBSCOUT_MAX_ITERATIONS", "lots");
    std::env::set_var("WEBSCOUT_FETCH_TIMEOUT_SECS", "-1");

    let config = ScoutConfig::from_env();

    assert_eq!(config.max_iterations, 5);
    assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
}

#[test]
fn env_overrides_file() {
    let _lock = env_lock_guard();
    let _env = clean_env();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "openai_api_key = \"sk-file\"\nmodel = \"gpt-3.5-turbo-16k\"\nmax_iterations = 2\n",
    )
    .unwrap();
    std::env::set_var("OPENAI_API_KEY", "sk-env");

    let mut config = ScoutConfig::from_file(&path).unwrap();
    config.apply_env();

    assert_eq!(config.require_api_key().unwrap(), "sk-env");
    assert_eq!(config.model, OpenAiModel::Gpt35Turbo16k);
    assert_eq!(config.max_iterations, 2);
}

#[test]
fn code_overrides_env() {
    let _lock = env_lock_guard();
    let _env = clean_env();
    std::env::set_var("OPENAI_API_KEY", "sk-env");
    std::env::set_var("WEBSCOUT_MODEL", "gpt-3.5-turbo");

    let mut config = ScoutConfig::from_env();
    config.set_api_key("sk-code");
    config.set_model("gpt-4");

    assert_eq!(config.require_api_key().unwrap(), "sk-code");
    assert_eq!(config.model, OpenAiModel::Gpt4);
}

#[test]
fn unknown_model_names_pass_through() {
    let mut config = ScoutConfig::default();
    config.set_model("gpt-4o-mini");
    assert_eq!(config.model, OpenAiModel::Custom("gpt-4o-mini".into()));
    assert_eq!(config.model.as_str(), "gpt-4o-mini");
    assert!(config.model.pricing_per_million().is_none());
}

#[test]
fn missing_key_message_asks_for_a_key() {
    let config = ScoutConfig::default();
    let err = config.require_api_key().unwrap_err();
    assert!(matches!(err, ScoutError::Configuration(ref m) if m.contains("OpenAI API key")));
}

#[test]
fn unreadable_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = ScoutConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ScoutError::Io(_)));
}

#[test]
fn loop_config_follows_scout_config() {
    let config = ScoutConfig::builder()
        .max_iterations(2)
        .temperature(0.3)
        .model_timeout(Duration::from_secs(9))
        .build();

    let loop_config = LoopConfig::from(&config);

    assert_eq!(loop_config.max_iterations, 2);
    assert_eq!(loop_config.model_timeout, Duration::from_secs(9));
    assert_eq!(loop_config.settings.temperature, Some(0.3));
}
