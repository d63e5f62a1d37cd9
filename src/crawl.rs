use crate::config::AppConfig;
use crate::content::{LinkItem, ParseResponse};
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, PageSource, RateLimiter};
use crate::parsers::Extractor;
use std::collections::{HashMap, HashSet};
use url::Url;

/// Related links kept per page walked, across the whole response
const LINKS_PER_DEPTH: usize = 10;

/// Walks a URL and the pages after it, extracting each one
pub struct Crawler<S> {
    source: S,
    extractor: Extractor,
    limiter: RateLimiter,
}

impl Crawler<Fetcher> {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            Fetcher::from_config(config)?,
            Extractor::from_config(config)?,
            RateLimiter::from_config(config),
        ))
    }
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, extractor: Extractor, limiter: RateLimiter) -> Self {
        Self {
            source,
            extractor,
            limiter,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Parse `url` and follow its next-page links, up to `depth` pages.
    ///
    /// The walk stops early at a page already visited, a page that cannot be
    /// fetched or one without readable content. Failing on the first page is
    /// an error; failing later just ends the walk.
    pub async fn parse_url(&self, url: &str, depth: usize) -> Result<ParseResponse> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::MissingField("URL"));
        }
        let mut current = Url::parse(url)?;
        let depth = depth.max(1);

        ::log::info!("Parsing {} (depth {})", current, depth);

        let mut pages = Vec::new();
        let mut all_links = Vec::new();
        let mut visited = HashSet::new();

        for current_depth in 0..depth {
            if !visited.insert(current.to_string()) {
                ::log::debug!("Already visited: {}", current);
                break;
            }

            self.limiter.acquire().await;
            let source = match self.source.fetch(&current).await {
                Ok(source) => source,
                Err(e) if pages.is_empty() => return Err(e),
                Err(e) => {
                    ::log::warn!("Failed to fetch page: {}", e);
                    break;
                }
            };

            let Some(extracted) = self.extractor.extract(&source, &current) else {
                ::log::warn!("No readable content at {}", current);
                break;
            };

            pages.push(extracted.page);
            all_links.extend(extracted.all_links);

            if current_depth + 1 == depth {
                break;
            }
            match extracted.next_page {
                Some(next) => current = next,
                None => break,
            }
        }

        if pages.is_empty() {
            return Err(Error::NoContent(url.to_string()));
        }

        ::log::info!("Parsed {} page(s) from {}", pages.len(), url);

        Ok(ParseResponse {
            pages,
            links: unique_links(all_links, LINKS_PER_DEPTH * depth),
        })
    }
}

/// One link per href, at most `limit` of them. A repeated href keeps the
/// position of its first occurrence and the text of its last.
fn unique_links(links: Vec<LinkItem>, limit: usize) -> Vec<LinkItem> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<LinkItem> = Vec::new();
    for link in links {
        match positions.get(&link.href) {
            Some(&position) => unique[position].text = link.text,
            None => {
                positions.insert(link.href.clone(), unique.len());
                unique.push(link);
            }
        }
    }
    unique.truncate(limit);
    unique
}
