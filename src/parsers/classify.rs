use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Characters of body text inspected when classifying
const CLASSIFY_PREFIX_CHARS: usize = 1000;

pub const DEFAULT_KIND: &str = "Article";

struct Rule {
    kind: &'static str,
    content: Regex,
    url_keywords: &'static [&'static str],
}

fn rule(kind: &'static str, pattern: &str, url_keywords: &'static [&'static str]) -> Rule {
    Rule {
        kind,
        content: Regex::new(pattern).expect("classification pattern is valid"),
        url_keywords,
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        rule(
            "News",
            r"\b(breaking news|latest update|press release)\b",
            &["news", "bbc", "cnn", "nytimes", "reuters", "ap"],
        ),
        rule(
            "Recipe",
            r"\b(ingredients|directions|prep time|cook time)\b",
            &["recipe", "food", "cooking"],
        ),
        rule(
            "Product",
            r"\b(add to cart|product details|shipping info)\b",
            &["product", "shop", "store"],
        ),
        rule(
            "Review",
            r"\b(review|rating|stars out of|verdict)\b",
            &["review"],
        ),
        rule(
            "Tutorial",
            r"\b(step [1-9]|how to|tutorial|guide)\b",
            &["tutorial", "how-to"],
        ),
        rule(
            "Blog Post",
            r"\b(posted on|blog post|thoughts on)\b",
            &["blog"],
        ),
    ]
});

/// Classifies a page from its URL and the start of its body text.
///
/// Rules are tried in order; the first whose content pattern matches, or
/// whose keyword appears in the host or path, names the type.
pub fn classify(url: &Url, text: &str) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let path = url.path().to_lowercase();
    let prefix = text
        .chars()
        .take(CLASSIFY_PREFIX_CHARS)
        .collect::<String>()
        .to_lowercase();

    RULES
        .iter()
        .find(|rule| {
            rule.content.is_match(&prefix)
                || rule
                    .url_keywords
                    .iter()
                    .any(|keyword| host.contains(keyword) || path.contains(keyword))
        })
        .map_or(DEFAULT_KIND, |rule| rule.kind)
        .to_string()
}
