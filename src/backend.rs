use crate::config::AppConfig;
use crate::content::{ParseResponse, ParsedDocument, SaveEntry, SaveId, SaveReceipt, value_to_text};
use crate::crawl::Crawler;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, PageSource};
use crate::store::SaveStore;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use url::Url;

pub const REMOVED_MESSAGE: &str = "Content removed successfully";
pub const REMOVED_ALL_MESSAGE: &str = "All content removed successfully";

/// Where parse and save requests are served
#[async_trait]
pub trait Backend: Send + Sync {
    /// Parse a URL and up to `depth - 1` following pages
    async fn parse(&self, url: &str, depth: usize) -> Result<ParseResponse>;

    async fn saves(&self) -> Result<Vec<SaveEntry>>;

    async fn save(&self, document: &ParsedDocument) -> Result<SaveReceipt>;

    async fn get(&self, id: SaveId) -> Result<SaveEntry>;

    /// Remove one saved document, returning the confirmation message
    async fn remove(&self, id: SaveId) -> Result<String>;

    async fn remove_all(&self) -> Result<String>;
}

#[async_trait]
impl<B: Backend + ?Sized> Backend for &B {
    async fn parse(&self, url: &str, depth: usize) -> Result<ParseResponse> {
        (**self).parse(url, depth).await
    }

    async fn saves(&self) -> Result<Vec<SaveEntry>> {
        (**self).saves().await
    }

    async fn save(&self, document: &ParsedDocument) -> Result<SaveReceipt> {
        (**self).save(document).await
    }

    async fn get(&self, id: SaveId) -> Result<SaveEntry> {
        (**self).get(id).await
    }

    async fn remove(&self, id: SaveId) -> Result<String> {
        (**self).remove(id).await
    }

    async fn remove_all(&self) -> Result<String> {
        (**self).remove_all().await
    }
}

/// Crawler and save store running in this process
pub struct LocalBackend<S> {
    crawler: Crawler<S>,
    store: SaveStore,
    writes: Mutex<()>,
}

impl LocalBackend<Fetcher> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            Crawler::from_config(config)?,
            SaveStore::new(config.saves_file.clone()),
        ))
    }

    /// Release the fetcher's browser session, if any
    pub async fn close(&self) {
        self.crawler.source().close().await;
    }
}

impl<S: PageSource> LocalBackend<S> {
    pub fn new(crawler: Crawler<S>, store: SaveStore) -> Self {
        Self {
            crawler,
            store,
            writes: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }
}

#[async_trait]
impl<S: PageSource> Backend for LocalBackend<S> {
    async fn parse(&self, url: &str, depth: usize) -> Result<ParseResponse> {
        self.crawler.parse_url(url, depth).await
    }

    async fn saves(&self) -> Result<Vec<SaveEntry>> {
        // Listing creates the file on first use
        let _guard = self.writes.lock().await;
        self.store.list()
    }

    async fn save(&self, document: &ParsedDocument) -> Result<SaveReceipt> {
        let _guard = self.writes.lock().await;
        self.store.save(document.clone())
    }

    async fn get(&self, id: SaveId) -> Result<SaveEntry> {
        let _guard = self.writes.lock().await;
        self.store.get(id)
    }

    async fn remove(&self, id: SaveId) -> Result<String> {
        let _guard = self.writes.lock().await;
        self.store.remove(id)?;
        Ok(REMOVED_MESSAGE.to_string())
    }

    async fn remove_all(&self) -> Result<String> {
        let _guard = self.writes.lock().await;
        self.store.clear()?;
        Ok(REMOVED_ALL_MESSAGE.to_string())
    }
}

#[derive(Deserialize)]
struct MessageReply {
    #[serde(default)]
    message: String,
}

/// A SaveIt server reached over HTTP
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    client: reqwest::Client,
    base: Url,
}

impl RemoteBackend {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut base = Url::parse(base_url.trim())?;
        // Without a trailing slash, joining would replace the last path segment
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn send<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        ::log::debug!("Server answered {} with {} bytes", status, body.len());

        let value = decode_response(status, &body)?;
        serde_json::from_value(value).map_err(|e| Error::Protocol(e.to_string()))
    }
}

/// Checks a server reply: non-JSON bodies, `{error}` bodies and non-2xx
/// statuses all become errors. An `{error}` body arriving with a 2xx status
/// is reported as a 500.
pub fn decode_response(status: u16, body: &str) -> Result<Value> {
    let success = (200..300).contains(&status);

    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) if success => {
            return Err(Error::Protocol("response is not JSON".to_string()));
        }
        Err(_) => {
            return Err(Error::Api {
                status,
                message: format!("HTTP {}", status),
            });
        }
    };

    if let Some(error) = value.get("error") {
        return Err(Error::Api {
            status: if success { 500 } else { status },
            message: value_to_text(error).into_owned(),
        });
    }

    if !success {
        return Err(Error::Api {
            status,
            message: format!("HTTP {}", status),
        });
    }

    Ok(value)
}

#[async_trait]
impl Backend for RemoteBackend {
    async fn parse(&self, url: &str, depth: usize) -> Result<ParseResponse> {
        if url.trim().is_empty() {
            return Err(Error::MissingField("URL"));
        }
        let request = self
            .client
            .post(self.endpoint("parse")?)
            .json(&json!({ "url": url, "depth": depth.max(1) }));
        self.send(request).await
    }

    async fn saves(&self) -> Result<Vec<SaveEntry>> {
        self.send(self.client.get(self.endpoint("saves")?)).await
    }

    async fn save(&self, document: &ParsedDocument) -> Result<SaveReceipt> {
        self.send(self.client.post(self.endpoint("save")?).json(document))
            .await
    }

    async fn get(&self, id: SaveId) -> Result<SaveEntry> {
        self.send(self.client.get(self.endpoint(&format!("save/{}", id))?))
            .await
    }

    async fn remove(&self, id: SaveId) -> Result<String> {
        let reply: MessageReply = self
            .send(self.client.post(self.endpoint(&format!("remove/{}", id))?))
            .await?;
        Ok(reply.message)
    }

    async fn remove_all(&self) -> Result<String> {
        let reply: MessageReply = self
            .send(self.client.post(self.endpoint("remove-all")?))
            .await?;
        Ok(reply.message)
    }
}
