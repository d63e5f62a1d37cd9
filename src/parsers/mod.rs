pub mod classify;
pub mod html;
pub mod links;
pub mod metadata;
pub mod text;

#[cfg(test)]
mod tests;

use crate::config::AppConfig;
use crate::content::{ContentNode, LinkItem, Metadata, PageResult};
use crate::error::Result;
use links::LinkFilter;
use scraper::Html;
use url::Url;

/// What kind of document a URL points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Html,
    /// Plain text, split into paragraphs
    Text,
    /// Media, stylesheets, scripts and PDFs
    Unsupported,
}

impl DocumentKind {
    /// Determines the document kind from the URL path
    pub fn from_url(url: &Url) -> Self {
        let path = url.path().to_lowercase();
        if path.ends_with(".txt") || path.ends_with(".md") {
            ::log::debug!("Classifying as Text: {}", url);
            DocumentKind::Text
        } else if [
            ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".css", ".js", ".zip",
        ]
        .iter()
        .any(|ext| path.ends_with(ext))
        {
            ::log::debug!("Classifying as Unsupported: {}", url);
            DocumentKind::Unsupported
        } else {
            DocumentKind::Html
        }
    }
}

/// Everything extracted from one fetched page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// The page, with its related links already capped
    pub page: PageResult,
    /// Every accepted link on the page, uncapped
    pub all_links: Vec<LinkItem>,
    pub next_page: Option<Url>,
}

/// Turns fetched page sources into content trees
#[derive(Debug)]
pub struct Extractor {
    page_links: LinkFilter,
    inline_links: LinkFilter,
    max_links_per_page: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self {
            page_links: LinkFilter::default(),
            inline_links: LinkFilter::inline(),
            max_links_per_page: 10,
        }
    }
}

impl Extractor {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let page_links = LinkFilter::default()
            .with_ignored_terms(&config.ignored_link_terms)
            .with_exclude_patterns(&config.exclude_link_patterns)?;

        Ok(Self {
            page_links,
            inline_links: LinkFilter::inline(),
            max_links_per_page: config.max_links_per_page,
        })
    }

    /// Extract a page; `None` when it holds no readable content
    pub fn extract(&self, source: &str, url: &Url) -> Option<ExtractedPage> {
        match DocumentKind::from_url(url) {
            DocumentKind::Html => self.extract_html(source, url),
            DocumentKind::Text => self.extract_text(source, url),
            DocumentKind::Unsupported => {
                ::log::warn!("Unsupported document type: {}", url);
                None
            }
        }
    }

    fn extract_html(&self, source: &str, url: &Url) -> Option<ExtractedPage> {
        let doc = Html::parse_document(source);

        let Some(main) = html::find_main_content(&doc) else {
            ::log::warn!("Failed to find main content for: {}", url);
            return None;
        };

        let content = html::ContentExtractor::new(url, &self.inline_links).extract(main);
        let metadata = metadata::extract_metadata(&doc);
        let kind = classify::classify(url, &body_text(&content));
        let all_links = links::extract_links(&doc, Some(main), url, &self.page_links);
        let next_page = links::find_next_page(&doc, url);

        ::log::info!(
            "Extracted {} blocks and {} links from {}",
            content.len(),
            all_links.len(),
            url
        );

        Some(self.page(url, content, metadata, kind, all_links, next_page))
    }

    fn extract_text(&self, source: &str, url: &Url) -> Option<ExtractedPage> {
        let content = text::parse(source);
        if content.is_empty() {
            return None;
        }
        let kind = classify::classify(url, &body_text(&content));
        Some(self.page(url, content, Metadata::default(), kind, Vec::new(), None))
    }

    fn page(
        &self,
        url: &Url,
        content: Vec<ContentNode>,
        metadata: Metadata,
        kind: String,
        all_links: Vec<LinkItem>,
        next_page: Option<Url>,
    ) -> ExtractedPage {
        ExtractedPage {
            page: PageResult {
                url: url.to_string(),
                content,
                metadata,
                kind,
                links: all_links.iter().take(self.max_links_per_page).cloned().collect(),
            },
            all_links,
            next_page,
        }
    }
}

/// Flat text of the blocks that carry a plain string
fn body_text(content: &[ContentNode]) -> String {
    content
        .iter()
        .filter_map(ContentNode::text)
        .collect::<Vec<_>>()
        .join(" ")
}
