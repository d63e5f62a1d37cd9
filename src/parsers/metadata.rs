use crate::content::{Author, Metadata};
use crate::parsers::html::page_text;
use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static AUTHOR_NAME: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"meta[name="author"]"#).expect("author selector is valid"));

static AUTHOR_URL: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[property="article:author"]"#).expect("author url selector is valid")
});

static MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s+\d{1,2},?\s+\d{4}\b")
        .expect("month date pattern is valid")
});

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("iso date pattern is valid"));

static SLASH_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2}/\d{2}/\d{4}").expect("slash date pattern is valid"));

/// Display format for normalized dates, e.g. "Mar 04, 2024"
const DATE_FORMAT: &str = "%b %d, %Y";

pub fn extract_metadata(doc: &Html) -> Metadata {
    Metadata {
        author: extract_author(doc),
        publication_date: extract_date(&page_text(doc)),
    }
}

/// Author name from `<meta name="author">`, profile URL from `<meta property="article:author">`
pub fn extract_author(doc: &Html) -> Option<Author> {
    let content = |selector: &Selector| {
        doc.select(selector)
            .next()
            .and_then(|meta| meta.value().attr("content"))
            .map(str::to_string)
    };

    let author = Author {
        name: content(&AUTHOR_NAME),
        url: content(&AUTHOR_URL),
    };
    (!author.is_empty()).then_some(author)
}

/// First date found in the text.
///
/// "Mon D, YYYY" dates are returned as written. Numeric dates are normalized
/// to "Mon DD, YYYY" when they parse and returned as written when they don't.
pub fn extract_date(text: &str) -> Option<String> {
    if let Some(found) = MONTH_DATE.find(text) {
        return Some(found.as_str().to_string());
    }

    if let Some(found) = ISO_DATE.find(text) {
        let raw = found.as_str();
        return Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|_| raw.to_string()),
        );
    }

    if let Some(found) = SLASH_DATE.find(text) {
        let raw = found.as_str();
        // Month first, falling back to day first when the month is out of range
        return Some(
            NaiveDate::parse_from_str(raw, "%m/%d/%Y")
                .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
                .map(|date| date.format(DATE_FORMAT).to_string())
                .unwrap_or_else(|_| raw.to_string()),
        );
    }

    None
}
