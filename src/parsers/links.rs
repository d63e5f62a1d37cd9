use crate::content::LinkItem;
use crate::parsers::html::{in_chrome, in_link_list};
use crate::parsers::text::join_fragments;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

static ANCHORS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("anchor selector is valid"));

static NEXT_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)next|older|»").expect("next-page pattern is valid"));

static PAGE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\?page=(\d+)").expect("page pattern is valid"));

/// Configuration for deciding which anchors count as related links
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkFilterConfig {
    /// Case-insensitive substrings that disqualify a link text
    #[serde(default)]
    pub ignored_terms: Vec<String>,

    /// Regex patterns that disqualify a link text
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Minimum trimmed length, in characters, of a link text
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,
}

fn default_min_text_len() -> usize {
    1
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Text that is only a number, or "N comments"
const COUNTER_PATTERN: &str = r"(?i)^(\d+|\d+\s+comments?)$";

impl Default for LinkFilterConfig {
    /// Filter for the page-wide related-links list
    fn default() -> Self {
        Self {
            ignored_terms: to_strings(&[
                "previous", "next", "older", "newer", "«", "»", "first", "last", "page",
                "comment", "reply",
            ]),
            exclude_patterns: vec![
                COUNTER_PATTERN.to_string(),
                // Version numbers
                r"\b\d+\.\d+(\.\d+)?\b".to_string(),
                // Dates
                r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2},?\s+\d{4}\b"
                    .to_string(),
            ],
            min_text_len: default_min_text_len(),
        }
    }
}

impl LinkFilterConfig {
    /// Stricter filter for anchors kept inside paragraph content
    pub fn inline() -> Self {
        Self {
            ignored_terms: to_strings(&[
                "sign up", "sign in", "follow", "login", "register", "subscribe", "next",
                "previous", "older", "newer", "back", "forward", "first", "last", "page",
                "comment", "reply", "edit", "« previous", "next »", "<<", ">>", "«", "»",
                "terms", "privacy", "cookie", "about us", "contact", "rss", "feed", "archive",
                "category", "tag",
            ]),
            exclude_patterns: vec![COUNTER_PATTERN.to_string()],
            min_text_len: 2,
        }
    }
}

/// Link filter built from a [`LinkFilterConfig`]
#[derive(Debug)]
pub struct LinkFilter {
    ignored_terms: Vec<String>,
    exclude_regexes: Vec<Regex>,
    min_text_len: usize,
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(LinkFilterConfig::default()).expect("Default link patterns should be valid")
    }
}

impl LinkFilter {
    /// Create a new link filter from configuration
    pub fn new(config: LinkFilterConfig) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(config.exclude_patterns.len());
        for pattern in &config.exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            ignored_terms: config
                .ignored_terms
                .iter()
                .map(|term| term.to_lowercase())
                .collect(),
            exclude_regexes,
            min_text_len: config.min_text_len,
        })
    }

    /// Inline-anchor filter
    pub fn inline() -> Self {
        Self::new(LinkFilterConfig::inline()).expect("Inline link patterns should be valid")
    }

    /// Add further disqualifying terms
    pub fn with_ignored_terms(mut self, terms: &[String]) -> Self {
        self.ignored_terms
            .extend(terms.iter().map(|term| term.to_lowercase()));
        self
    }

    /// Add further disqualifying patterns
    pub fn with_exclude_patterns(mut self, patterns: &[String]) -> Result<Self, regex::Error> {
        for pattern in patterns {
            self.exclude_regexes.push(Regex::new(pattern)?);
        }
        Ok(self)
    }

    /// Decide whether an anchor with this text and resolved target is kept
    pub fn accepts(&self, text: &str, href: &Url) -> bool {
        let text = text.trim();
        if text.chars().count() < self.min_text_len.max(1) {
            return false;
        }

        if !matches!(href.scheme(), "http" | "https") {
            return false;
        }

        let lower = text.to_lowercase();
        if self.ignored_terms.iter().any(|term| lower.contains(term)) {
            ::log::trace!("Link text {:?} contains an ignored term", text);
            return false;
        }

        if self.exclude_regexes.iter().any(|regex| regex.is_match(text)) {
            ::log::trace!("Link text {:?} matches an exclude pattern", text);
            return false;
        }

        true
    }
}

/// Resolve an href against the page URL
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    base.join(href.trim()).ok()
}

/// Collects every acceptable anchor in document order. Anchors in the page
/// chrome, or in link-only lists inside `main`, are left out.
pub fn extract_links(
    doc: &Html,
    main: Option<ElementRef>,
    base: &Url,
    filter: &LinkFilter,
) -> Vec<LinkItem> {
    let links: Vec<LinkItem> = doc
        .select(&ANCHORS)
        .filter(|anchor| !in_chrome(anchor))
        .filter(|anchor| !main.is_some_and(|main| in_link_list(anchor, &main)))
        .filter_map(|anchor| {
            let href = resolve(base, anchor.value().attr("href")?)?;
            let text = join_fragments(anchor.text());
            filter.accepts(&text, &href).then(|| LinkItem {
                href: href.to_string(),
                text,
            })
        })
        .collect();

    ::log::debug!("Found {} related links on {}", links.len(), base);
    links
}

/// Finds the URL of the following page, if the page links to one.
///
/// An anchor whose text mentions "next", "older" or "»" wins; otherwise a
/// `?page=N` link for the page after the current one.
pub fn find_next_page(doc: &Html, base: &Url) -> Option<Url> {
    let labelled = doc
        .select(&ANCHORS)
        .find(|anchor| NEXT_TEXT.is_match(&anchor.text().collect::<String>()));
    if let Some(href) = labelled.and_then(|anchor| anchor.value().attr("href")) {
        return resolve(base, href);
    }

    let current_page = page_number(base.as_str()).unwrap_or(1);
    doc.select(&ANCHORS)
        .filter_map(|anchor| anchor.value().attr("href"))
        .find(|href| page_number(href) == Some(current_page + 1))
        .and_then(|href| resolve(base, href))
}

fn page_number(url: &str) -> Option<u64> {
    PAGE_PARAM
        .captures(url)
        .and_then(|captures| captures.get(1))
        .and_then(|number| number.as_str().parse().ok())
}
