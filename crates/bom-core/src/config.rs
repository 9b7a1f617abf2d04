use std::env;

/// Settings for the Gemini suggestion backend.
///
/// The API key is optional here: a missing key only fails the suggestion
/// fetch, never the rest of the program.
#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    /// Model name, e.g. `gemini-2.5-flash`.
    pub model: String,
    /// Scheme and host of the API, without a trailing slash.
    pub base_url: String,
}

impl GeminiConfig {
    pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

    /// Environment variables checked for the API key, highest priority first.
    pub const API_KEY_VARS: [&str; 3] = ["BOM_API_KEY", "GEMINI_API_KEY", "API_KEY"];

    /// Build a config with default model and endpoint.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: Self::DEFAULT_MODEL.to_owned(),
            base_url: Self::DEFAULT_BASE_URL.to_owned(),
        }
    }

    /// Build a config from the environment.
    ///
    /// Key: first non-empty of [`Self::API_KEY_VARS`]. Model:
    /// `BOM_GEMINI_MODEL`. Endpoint: `BOM_GEMINI_BASE_URL`.
    pub fn from_env() -> Self {
        let mut cfg = Self::new(api_key_from_env());
        if let Ok(model) = env::var("BOM_GEMINI_MODEL") {
            cfg = cfg.with_model(model);
        }
        if let Ok(url) = env::var("BOM_GEMINI_BASE_URL") {
            cfg = cfg.with_base_url(url);
        }
        cfg
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.base_url = trimmed.to_owned();
        }
        self
    }

    /// Full URL of the `generateContent` endpoint for the configured model.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// First non-empty API key found in the environment.
pub fn api_key_from_env() -> Option<String> {
    GeminiConfig::API_KEY_VARS
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find(|v| !v.trim().is_empty())
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
