use crate::error::Result;
use crate::render::{ContentRenderer, DocumentView, TitlePolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How pages are fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Plain HTTP GET
    #[default]
    Http,
    /// Through a WebDriver session, for pages that need a browser
    WebDriver,
}

/// Application configuration, loaded from a JSON file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// JSON file holding saved documents
    #[serde(default = "default_saves_file")]
    pub saves_file: PathBuf,

    #[serde(default)]
    pub fetcher: FetcherKind,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// User agent sent with plain HTTP fetches
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Page fetches allowed per period
    #[serde(default = "default_rate_limit_calls")]
    pub rate_limit_calls: usize,

    #[serde(default = "default_rate_limit_period_secs")]
    pub rate_limit_period_secs: u64,

    /// Related links kept for each page
    #[serde(default = "default_max_links_per_page")]
    pub max_links_per_page: usize,

    /// Extra case-insensitive terms that disqualify a related link
    #[serde(default)]
    pub ignored_link_terms: Vec<String>,

    /// Extra regex patterns that disqualify a related link
    #[serde(default)]
    pub exclude_link_patterns: Vec<String>,

    #[serde(default = "default_max_render_depth")]
    pub max_render_depth: usize,

    /// Keep the title heading inside the body instead of extracting it
    #[serde(default)]
    pub inline_title: bool,

    /// Base URL of a remote SaveIt server; the local store is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

fn default_saves_file() -> PathBuf {
    PathBuf::from("/tmp/saves.json")
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_rate_limit_calls() -> usize {
    1
}

fn default_rate_limit_period_secs() -> u64 {
    5
}

fn default_max_links_per_page() -> usize {
    10
}

fn default_max_render_depth() -> usize {
    crate::render::DEFAULT_MAX_DEPTH
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            saves_file: default_saves_file(),
            fetcher: FetcherKind::default(),
            webdriver_url: default_webdriver_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            rate_limit_calls: default_rate_limit_calls(),
            rate_limit_period_secs: default_rate_limit_period_secs(),
            max_links_per_page: default_max_links_per_page(),
            ignored_link_terms: Vec::new(),
            exclude_link_patterns: Vec::new(),
            max_render_depth: default_max_render_depth(),
            inline_title: false,
            api_url: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Apply `WEBDRIVER_URL`, `SAVEIT_SAVES_FILE` and `SAVEIT_API_URL` from the environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(webdriver_url) = get("WEBDRIVER_URL") {
            self.webdriver_url = webdriver_url;
        }
        if let Some(saves_file) = get("SAVEIT_SAVES_FILE") {
            self.saves_file = PathBuf::from(saves_file);
        }
        if let Some(api_url) = get("SAVEIT_API_URL") {
            self.api_url = Some(api_url);
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn rate_limit_period(&self) -> Duration {
        Duration::from_secs(self.rate_limit_period_secs)
    }

    /// Document view configured with this render depth and title policy
    pub fn document_view(&self) -> DocumentView {
        let policy = if self.inline_title {
            TitlePolicy::Inline
        } else {
            TitlePolicy::Extract
        };
        DocumentView::new(
            ContentRenderer::new().with_max_depth(self.max_render_depth),
            policy,
        )
    }
}
