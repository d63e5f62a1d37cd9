use crate::config::{AppConfig, FetcherKind};
use crate::error::{Error, Result};
use async_trait::async_trait;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep, timeout};
use url::Url;

/// Something that can turn a URL into page source
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// Plain HTTP GET with a browser user agent
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(user_agent: &str, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(request_timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        ::log::debug!("GET {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::fetch(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch(url.as_str(), format!("status {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(url.as_str(), e))
    }
}

/// Common WebDriver endpoints tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444",
];

/// Fetches pages through a WebDriver session, for pages that need a browser.
///
/// The session is opened on first use and reopened once if it is lost.
pub struct WebDriverSource {
    webdriver_url: String,
    page_timeout: Duration,
    client: Mutex<Option<Client>>,
}

impl WebDriverSource {
    pub fn new(webdriver_url: impl Into<String>, page_timeout: Duration) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            page_timeout,
            client: Mutex::new(None),
        }
    }

    /// End the WebDriver session, if one is open
    pub async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver session: {}", e);
            }
        }
    }

    async fn connect(&self) -> Result<Client> {
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(client);
            }
            Err(e) => {
                ::log::error!(
                    "Failed to connect to WebDriver at {}: {}",
                    self.webdriver_url,
                    e
                );
            }
        }

        for url in FALLBACK_WEBDRIVER_URLS {
            if *url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(Error::fetch(&self.webdriver_url, "no WebDriver server reachable"))
    }

    async fn navigate(client: &Client, url: &Url) -> std::result::Result<String, CmdError> {
        client.goto(url.as_str()).await?;
        client.source().await
    }
}

fn is_lost_session(error: &CmdError) -> bool {
    error.to_string().contains("Unable to find session")
}

#[async_trait]
impl PageSource for WebDriverSource {
    async fn fetch(&self, url: &Url) -> Result<String> {
        let mut guard = self.client.lock().await;

        for attempt in 0..2 {
            let client = match guard.clone() {
                Some(client) => client,
                None => {
                    let client = self.connect().await?;
                    *guard = Some(client.clone());
                    client
                }
            };

            let outcome = timeout(self.page_timeout, Self::navigate(&client, url)).await;
            match outcome {
                Ok(Ok(source)) => {
                    ::log::debug!("Fetched {} through WebDriver", url);
                    return Ok(source);
                }
                Ok(Err(e)) if attempt == 0 && is_lost_session(&e) => {
                    ::log::warn!("Lost WebDriver session while accessing {}, reconnecting", url);
                    *guard = None;
                }
                Ok(Err(e)) => return Err(Error::fetch(url.as_str(), e)),
                Err(_) => {
                    ::log::error!("Timeout fetching: {}", url);
                    return Err(Error::fetch(url.as_str(), "timed out"));
                }
            }
        }

        Err(Error::fetch(url.as_str(), "WebDriver session lost"))
    }
}

/// The page source chosen by configuration
pub enum Fetcher {
    Http(HttpSource),
    WebDriver(WebDriverSource),
}

impl Fetcher {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(match config.fetcher {
            FetcherKind::Http => Fetcher::Http(HttpSource::new(
                &config.user_agent,
                config.request_timeout(),
            )?),
            FetcherKind::WebDriver => Fetcher::WebDriver(WebDriverSource::new(
                config.webdriver_url.clone(),
                config.request_timeout(),
            )),
        })
    }

    pub fn kind(&self) -> FetcherKind {
        match self {
            Fetcher::Http(_) => FetcherKind::Http,
            Fetcher::WebDriver(_) => FetcherKind::WebDriver,
        }
    }

    /// Release any browser session held by the fetcher
    pub async fn close(&self) {
        if let Fetcher::WebDriver(source) = self {
            source.close().await;
        }
    }
}

#[async_trait]
impl PageSource for Fetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        match self {
            Fetcher::Http(source) => source.fetch(url).await,
            Fetcher::WebDriver(source) => source.fetch(url).await,
        }
    }
}

/// Allows at most `calls` acquisitions in any window of `period`; callers
/// beyond that wait until the oldest acquisition leaves the window.
#[derive(Debug)]
pub struct RateLimiter {
    calls: usize,
    period: Duration,
    recent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(calls: usize, period: Duration) -> Self {
        Self {
            calls: calls.max(1),
            period,
            recent: Mutex::new(VecDeque::new()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.rate_limit_calls, config.rate_limit_period())
    }

    /// A limiter that never waits
    pub fn unlimited() -> Self {
        Self::new(usize::MAX, Duration::ZERO)
    }

    /// Wait for a slot, then take it
    pub async fn acquire(&self) {
        let mut recent = self.recent.lock().await;
        loop {
            let now = Instant::now();
            while recent
                .front()
                .is_some_and(|&at| now.duration_since(at) >= self.period)
            {
                recent.pop_front();
            }

            if recent.len() < self.calls {
                recent.push_back(now);
                return;
            }

            if let Some(&oldest) = recent.front() {
                let wait = self.period.saturating_sub(now.duration_since(oldest));
                ::log::trace!("Rate limit reached, waiting {:?}", wait);
                sleep(wait).await;
            }
        }
    }
}
