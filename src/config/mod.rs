//! Configuration (layered: code > env > config file).

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;
use tracing::debug;

use crate::error::{Result, ScoutError};
use crate::models::OpenAiModel;
use crate::search::{SafeSearch, DEFAULT_REGION};

/// Default number of tool-call rounds before the loop gives up.
pub const DEFAULT_MAX_ITERATIONS: usize = 5;
/// Default per-request timeout for page fetches.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
/// Default timeout for a single search backend request.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Default timeout for a single model request.
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(120);

/// Runtime configuration, passed explicitly into sessions and loops.
///
/// Resolution order for every field:
/// 1. Values set in code (builder or setters)
/// 2. Environment variables (`.env` is loaded first if present)
/// 3. `config.toml` in the platform config directory
#[derive(Clone, Builder)]
pub struct ScoutConfig {
    #[builder(into)]
    pub openai_api_key: Option<String>,
    #[builder(into)]
    pub openai_base_url: Option<String>,
    #[builder(into)]
    pub search_base_url: Option<String>,
    /// DuckDuckGo region code, e.g. `wt-wt` (worldwide) or `us-en`.
    #[builder(into, default = DEFAULT_REGION.to_string())]
    pub search_region: String,
    #[builder(default)]
    pub safe_search: SafeSearch,
    #[builder(default)]
    pub model: OpenAiModel,
    #[builder(default = 0.0)]
    pub temperature: f64,
    #[builder(default = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,
    #[builder(default = DEFAULT_FETCH_TIMEOUT)]
    pub fetch_timeout: Duration,
    #[builder(default = DEFAULT_SEARCH_TIMEOUT)]
    pub search_timeout: Duration,
    #[builder(default = DEFAULT_MODEL_TIMEOUT)]
    pub model_timeout: Duration,
}

impl fmt::Debug for ScoutConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoutConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| ".."))
            .field("openai_base_url", &self.openai_base_url)
            .field("search_base_url", &self.search_base_url)
            .field("search_region", &self.search_region)
            .field("safe_search", &self.safe_search)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_iterations", &self.max_iterations)
            .field("fetch_timeout", &self.fetch_timeout)
            .field("search_timeout", &self.search_timeout)
            .field("model_timeout", &self.model_timeout)
            .finish()
    }
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// On-disk shape of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    openai_api_key: Option<String>,
    openai_base_url: Option<String>,
    search_base_url: Option<String>,
    search_region: Option<String>,
    safe_search: Option<String>,
    model: Option<String>,
    temperature: Option<f64>,
    max_iterations: Option<usize>,
    fetch_timeout_secs: Option<u64>,
    search_timeout_secs: Option<u64>,
    model_timeout_secs: Option<u64>,
}

impl ScoutConfig {
    /// Load the default layering: config file, then environment on top.
    pub fn load() -> Result<Self> {
        let mut config = match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Environment only, ignoring any config file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let file: FileConfig = toml::from_str(&raw).map_err(|e| {
            ScoutError::Configuration(format!("{}: {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded config file");

        let mut config = Self::default();
        config.openai_api_key = file.openai_api_key;
        config.openai_base_url = file.openai_base_url;
        config.search_base_url = file.search_base_url;
        if let Some(region) = file.search_region {
            config.search_region = region;
        }
        if let Some(level) = file.safe_search {
            config.safe_search = level.trim().parse().map_err(|_| {
                ScoutError::Configuration(format!(
                    "{}: safe_search must be one of on, moderate, off (got '{level}')",
                    path.display()
                ))
            })?;
        }
        if let Some(model) = file.model {
            config.set_model(&model);
        }
        if let Some(t) = file.temperature {
            config.temperature = t;
        }
        if let Some(n) = file.max_iterations {
            config.max_iterations = n;
        }
        if let Some(secs) = file.fetch_timeout_secs {
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.search_timeout_secs {
            config.search_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = file.model_timeout_secs {
            config.model_timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }

    /// Overlay environment variables onto this config.
    pub fn apply_env(&mut self) {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            self.openai_base_url = Some(url);
        }
        if let Ok(url) = std::env::var("WEBSCOUT_SEARCH_BASE_URL") {
            self.search_base_url = Some(url);
        }
        if let Ok(region) = std::env::var("WEBSCOUT_SEARCH_REGION") {
            self.search_region = region;
        }
        if let Some(level) = env_parse::<SafeSearch>("WEBSCOUT_SAFE_SEARCH") {
            self.safe_search = level;
        }
        if let Ok(model) = std::env::var("WEBSCOUT_MODEL") {
            self.set_model(&model);
        }
        if let Some(n) = env_parse::<usize>("WEBSCOUT_MAX_ITERATIONS") {
            self.max_iterations = n;
        }
        if let Some(secs) = env_parse::<u64>("WEBSCOUT_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout = Duration::from_secs(secs);
        }
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.openai_api_key = Some(key.into());
    }

    pub fn set_model(&mut self, model: &str) {
        // OpenAiModel parsing is infallible thanks to the Custom fallback.
        if let Ok(m) = model.parse() {
            self.model = m;
        }
    }

    /// The API key, or the configuration error that must block turn submission.
    pub fn require_api_key(&self) -> Result<&str> {
        match self.openai_api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(ScoutError::Configuration(
                "Please add your OpenAI API key to continue (OPENAI_API_KEY)".into(),
            )),
        }
    }

    /// Whether credentials are configured.
    pub fn has_credentials(&self) -> bool {
        self.require_api_key().is_ok()
    }
}

/// `<config dir>/webscout/config.toml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "webscout")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
