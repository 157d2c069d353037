//! Settings structures for searchsynth configuration

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Most results one Custom Search request can return
pub const MAX_RESULT_COUNT: usize = 10;

/// Main settings structure matching searchsynth.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search: SearchSettings,
    pub fetch: FetchSettings,
    pub synthesis: SynthesisSettings,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse settings from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(content)?;
        Ok(settings)
    }

    /// Merge with environment variables
    ///
    /// Credentials use the names the upstream services document
    /// (`GOOGLE_API_KEY`, `OPENAI_API_KEY`, ...); everything else uses the
    /// `SEARCHSYNTH_` prefix.
    pub fn merge_env(&mut self) {
        self.merge_from(|key| std::env::var(key).ok());
    }

    /// Merge values from an arbitrary lookup, used by [`Settings::merge_env`]
    pub fn merge_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("GOOGLE_API_KEY") {
            self.search.api_key = Some(val);
        }
        if let Some(val) = lookup("GOOGLE_CSE_ID") {
            self.search.engine_id = Some(val);
        }
        if let Some(val) = lookup("OPENAI_API_KEY") {
            self.synthesis.openai.api_key = Some(val);
        }
        if let Some(val) = lookup("GEMINI_API_KEY") {
            self.synthesis.gemini.api_key = Some(val);
        }
        if let Some(val) = lookup("SEARCHSYNTH_RESULT_COUNT") {
            if let Ok(count) = val.parse() {
                self.search.result_count = count;
            }
        }
        if let Some(val) = lookup("SEARCHSYNTH_FETCH_STRATEGY") {
            if let Ok(strategy) = val.parse() {
                self.fetch.strategy = strategy;
            }
        }
        if let Some(val) = lookup("SEARCHSYNTH_PROVIDER") {
            if let Ok(provider) = val.parse() {
                self.synthesis.provider = provider;
            }
        }
        if let Some(val) = lookup("SEARCHSYNTH_CHROME") {
            self.fetch.chrome_executable = Some(val);
        }
    }

    /// Check invariants the pipeline relies on
    pub fn validate(&self) -> Result<()> {
        if self.search.result_count == 0 || self.search.result_count > MAX_RESULT_COUNT {
            return Err(Error::Config(format!(
                "result_count must be between 1 and {}",
                MAX_RESULT_COUNT
            )));
        }
        if self.fetch.max_chars == 0 || self.fetch.max_chars < self.fetch.min_chars {
            return Err(Error::Config(format!(
                "max_chars ({}) must be positive and not below min_chars ({})",
                self.fetch.max_chars, self.fetch.min_chars
            )));
        }
        let timeouts = [
            ("search.timeout", self.search.timeout),
            ("fetch.timeout", self.fetch.timeout),
            ("fetch.render_timeout", self.fetch.render_timeout),
            ("synthesis.timeout", self.synthesis.timeout),
        ];
        for (name, secs) in timeouts {
            if !(secs.is_finite() && secs > 0.0) {
                return Err(Error::Config(format!(
                    "{} must be a positive number of seconds, got {}",
                    name, secs
                )));
            }
        }
        if is_blank(&self.search.api_key) || is_blank(&self.search.engine_id) {
            return Err(Error::Config(
                "search credentials missing (set GOOGLE_API_KEY and GOOGLE_CSE_ID)".into(),
            ));
        }
        let provider_key = match self.synthesis.provider {
            SynthesisBackend::Openai => &self.synthesis.openai.api_key,
            SynthesisBackend::Gemini => &self.synthesis.gemini.api_key,
        };
        if is_blank(provider_key) {
            return Err(Error::Config(format!(
                "API key missing for synthesis provider '{}'",
                self.synthesis.provider
            )));
        }
        Ok(())
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, |v| v.trim().is_empty())
}

/// Search backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Custom Search JSON API endpoint
    pub endpoint: String,
    /// API key
    pub api_key: Option<String>,
    /// Programmable search engine id (`cx`)
    pub engine_id: Option<String>,
    /// Number of results kept for the run
    pub result_count: usize,
    /// Number of results requested from the backend
    pub request_count: usize,
    /// Request timeout in seconds
    pub timeout: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            api_key: None,
            engine_id: None,
            result_count: 5,
            request_count: 10,
            timeout: 5.0,
        }
    }
}

/// How page content is retrieved
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Plain HTTP GET, no script execution
    #[default]
    Lightweight,
    /// Headless browser, scripts executed
    Rendered,
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStrategy::Lightweight => write!(f, "lightweight"),
            FetchStrategy::Rendered => write!(f, "rendered"),
        }
    }
}

impl std::str::FromStr for FetchStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "lightweight" => Ok(FetchStrategy::Lightweight),
            "rendered" => Ok(FetchStrategy::Rendered),
            other => Err(Error::Config(format!("unknown fetch strategy: {}", other))),
        }
    }
}

/// Page fetch settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Strategy used for every page in a run
    pub strategy: FetchStrategy,
    /// Lightweight GET timeout in seconds
    pub timeout: f64,
    /// Rendered navigation timeout in seconds
    pub render_timeout: f64,
    /// Extracted text at or below this many characters counts as empty
    pub min_chars: usize,
    /// Excerpts are cut to this many characters
    pub max_chars: usize,
    /// Appended to the generated user agent
    pub useragent_suffix: Option<String>,
    /// Verify TLS certificates
    pub verify_ssl: bool,
    /// Chrome/Chromium binary, autodetected when unset
    pub chrome_executable: Option<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            strategy: FetchStrategy::default(),
            timeout: 5.0,
            render_timeout: 10.0,
            min_chars: 100,
            max_chars: 2000,
            useragent_suffix: None,
            verify_ssl: true,
            chrome_executable: None,
        }
    }
}

/// Which language-model service writes the answer
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisBackend {
    /// OpenAI chat completions
    #[default]
    Openai,
    /// Google Gemini generateContent
    Gemini,
}

impl std::fmt::Display for SynthesisBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SynthesisBackend::Openai => write!(f, "openai"),
            SynthesisBackend::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for SynthesisBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(SynthesisBackend::Openai),
            "gemini" => Ok(SynthesisBackend::Gemini),
            other => Err(Error::Config(format!(
                "unknown synthesis provider: {}",
                other
            ))),
        }
    }
}

/// Synthesis settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    /// Provider used for the run
    pub provider: SynthesisBackend,
    /// Response length cap in tokens
    pub max_tokens: u32,
    /// Request timeout in seconds
    pub timeout: f64,
    pub openai: OpenAiSettings,
    pub gemini: GeminiSettings,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            provider: SynthesisBackend::default(),
            max_tokens: 250,
            timeout: 60.0,
            openai: OpenAiSettings::default(),
            gemini: GeminiSettings::default(),
        }
    }
}

/// OpenAI connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// Base URL of the API, including the version segment
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: None,
            model: "gpt-3.5-turbo".to_string(),
        }
    }
}

/// Gemini connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// Base URL of the API, including the version segment
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
        }
    }
}
