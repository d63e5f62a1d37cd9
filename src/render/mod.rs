//! Content-node tree to HTML.
//!
//! Every leaf string passes through [`escape_html`] exactly once on its way
//! into the output. Unrecognised node shapes render as nothing, so one bad
//! node never blanks the rest of the document.

pub mod document;
pub mod escape;

pub use document::{DocumentAction, DocumentView, TitlePolicy, render_page};
pub use escape::{escape_html, escape_value};

use crate::content::{ContentNode, Element, LinkItem, NodeText};
use serde_json::Value;

/// Default bound on node nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Output for an empty or unreadable content list
pub const EMPTY_CONTENT: &str = "<p class=\"notice\">No content available.</p>";

/// Output in place of a subtree nested past the depth bound
pub const TOO_DEEP: &str = "<p class=\"notice\">Content nested too deeply to display.</p>";

/// Elements that would be live if emitted; their tags are rendered as `span`
const UNSAFE_TAGS: &[&str] = &[
    "script", "style", "iframe", "frame", "frameset", "object", "embed", "applet", "link", "meta",
    "base", "form", "input", "button", "textarea", "select", "svg", "math", "template", "noscript",
    "title", "html", "head", "body",
];

const VOID_TAGS: &[&str] = &["br", "hr", "wbr"];

/// Pick the element name to emit for an untrusted tag
fn safe_tag(tag: &str) -> &str {
    let well_formed = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && tag.chars().all(|c| c.is_ascii_alphanumeric());
    if well_formed && !UNSAFE_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
        tag
    } else {
        "span"
    }
}

/// Renders content-node sequences to HTML fragments
#[derive(Debug, Clone, Copy)]
pub struct ContentRenderer {
    max_depth: usize,
}

impl Default for ContentRenderer {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ContentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how deep nodes may nest before a subtree is replaced by a notice
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Render a node sequence, one blank line between top-level nodes
    pub fn render(&self, content: &[ContentNode]) -> String {
        if content.is_empty() {
            return EMPTY_CONTENT.to_string();
        }

        content
            .iter()
            .map(|node| self.node(node, 0))
            .filter(|html| !html.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Render raw JSON; anything but a non-empty array gives the empty-content notice
    pub fn render_value(&self, value: &Value) -> String {
        match value {
            Value::Array(items) => {
                let nodes: Vec<ContentNode> = items.iter().cloned().map(ContentNode::from).collect();
                self.render(&nodes)
            }
            other => {
                ::log::debug!("Content is not a list: {}", other);
                EMPTY_CONTENT.to_string()
            }
        }
    }

    /// Render the payload of a `pre` node
    pub fn render_pre(&self, text: &NodeText) -> String {
        self.pre(text, 0)
    }

    /// Render the payload of a `blockquote` node
    pub fn render_blockquote(&self, text: &NodeText) -> String {
        self.blockquote(text, 0)
    }

    /// Render the related-links list; empty input gives an empty string
    pub fn render_links(&self, links: &[LinkItem]) -> String {
        if links.is_empty() {
            return String::new();
        }

        let items = links
            .iter()
            .map(|link| {
                format!(
                    "<li><a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a></li>",
                    escape_html(&link.href),
                    escape_html(&link.text)
                )
            })
            .collect::<String>();
        format!("<ul class=\"links\">{}</ul>", items)
    }

    fn too_deep(&self, depth: usize) -> bool {
        if depth > self.max_depth {
            ::log::warn!("Content nesting exceeds {} levels, truncating", self.max_depth);
            true
        } else {
            false
        }
    }

    fn node(&self, node: &ContentNode, depth: usize) -> String {
        if self.too_deep(depth) {
            return TOO_DEEP.to_string();
        }

        match node {
            ContentNode::Bare(text) => escape_html(text),
            ContentNode::Element(element) => self.element(element, depth),
            ContentNode::Unknown(_) => String::new(),
        }
    }

    fn element(&self, element: &Element, depth: usize) -> String {
        match element.tag.as_deref() {
            Some("pre") => return self.pre(&element.text, depth),
            Some("blockquote") => return self.blockquote(&element.text, depth),
            _ => {}
        }

        let inner = match &element.text {
            NodeText::Leaf(text) | NodeText::Wrapped(text) => escape_html(text),
            NodeText::Children(children) => children
                .iter()
                .map(|child| self.node(child, depth + 1))
                .collect(),
            // Unrecognised payloads are dropped
            NodeText::Opaque(_) => return String::new(),
        };
        wrap(element, &inner)
    }

    fn pre(&self, text: &NodeText, depth: usize) -> String {
        match text {
            NodeText::Children(children) => {
                let inner: String = children
                    .iter()
                    .map(|child| self.pre_child(child, depth + 1))
                    .collect();
                format!("<pre>{}</pre>", inner)
            }
            absent if absent.is_absent() => "<pre></pre>".to_string(),
            other => {
                let raw = serde_json::to_string_pretty(other).unwrap_or_default();
                format!("<pre>{}</pre>", escape_html(&raw))
            }
        }
    }

    fn pre_child(&self, node: &ContentNode, depth: usize) -> String {
        if self.too_deep(depth) {
            return TOO_DEEP.to_string();
        }

        let element = match node {
            ContentNode::Bare(text) => return escape_html(text),
            ContentNode::Element(element) => element,
            ContentNode::Unknown(_) => return String::new(),
        };

        match element.tag.as_deref() {
            Some("span") => {
                let inner = match &element.content {
                    Some(NodeText::Children(children)) => children
                        .iter()
                        .map(|child| self.pre_child(child, depth + 1))
                        .collect(),
                    Some(other) => escape_html(&other.leaf_text()),
                    None => escape_html(&element.text.leaf_text()),
                };
                format!("<span>{}</span>", inner)
            }
            Some("br") => "\n".to_string(),
            None => escape_html(&element.text.leaf_text()),
            Some(_) => {
                let inner = match &element.text {
                    NodeText::Children(children) => children
                        .iter()
                        .map(|child| self.pre_child(child, depth + 1))
                        .collect(),
                    text => escape_html(&text.leaf_text()),
                };
                wrap(element, &inner)
            }
        }
    }

    fn blockquote(&self, text: &NodeText, depth: usize) -> String {
        let inner = match text {
            NodeText::Children(children) => children
                .iter()
                .map(|child| self.blockquote_child(child, depth + 1))
                .collect(),
            other => escape_html(&other.leaf_text()),
        };
        format!("<blockquote>{}</blockquote>", inner)
    }

    fn blockquote_child(&self, node: &ContentNode, depth: usize) -> String {
        if self.too_deep(depth) {
            return TOO_DEEP.to_string();
        }

        let element = match node {
            ContentNode::Bare(text) => return format!("<p>{}</p>", escape_html(text)),
            ContentNode::Element(element) => element,
            ContentNode::Unknown(_) => return String::new(),
        };

        match element.tag.as_deref() {
            Some("p") => self.element(element, depth),
            Some("br") => "<br>".to_string(),
            None => escape_html(&element.text.leaf_text()),
            Some(_) => match &element.text {
                NodeText::Children(_) => self.element(element, depth),
                text => wrap(element, &escape_html(&text.leaf_text())),
            },
        }
    }
}

/// Wrap already-escaped inner HTML in the element's tag
fn wrap(element: &Element, inner: &str) -> String {
    let Some(tag) = element.tag.as_deref() else {
        return inner.to_string();
    };
    let tag = safe_tag(tag);

    if VOID_TAGS.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
        return format!("<{}>", tag);
    }
    match (tag, element.href.as_deref()) {
        ("a", Some(href)) => format!("<a href=\"{}\">{}</a>", escape_html(href), inner),
        _ => format!("<{tag}>{inner}</{tag}>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: Value) -> String {
        ContentRenderer::new().render_value(&value)
    }

    #[test]
    fn test_empty_and_null_content() {
        assert_eq!(render(json!([])), EMPTY_CONTENT);
        assert_eq!(render(Value::Null), EMPTY_CONTENT);
        assert_eq!(render(json!({"tag": "p"})), EMPTY_CONTENT);
        assert!(!EMPTY_CONTENT.is_empty());
    }

    #[test]
    fn test_leaf_is_escaped() {
        assert_eq!(render(json!([{"tag": "p", "text": "a<b"}])), "<p>a&lt;b</p>");
    }

    #[test]
    fn test_nested_children() {
        assert_eq!(
            render(json!([{"tag": "ul", "text": [{"tag": "li", "text": "x"}]}])),
            "<ul><li>x</li></ul>"
        );
        assert_eq!(
            render(json!([{"tag": "ol", "text": [
                {"tag": "li", "text": [{"tag": "strong", "text": "deep & bold"}]}
            ]}])),
            "<ol><li><strong>deep &amp; bold</strong></li></ol>"
        );
    }

    #[test]
    fn test_wrapped_text_unwraps_once() {
        assert_eq!(
            render(json!([{"tag": "h3", "text": {"text": "<wrapped>"}}])),
            "<h3>&lt;wrapped&gt;</h3>"
        );
    }

    #[test]
    fn test_nodes_joined_by_blank_line_and_bad_nodes_dropped() {
        let html = render(json!([
            {"tag": "h1", "text": "Title"},
            {"tag": "p", "text": 17},
            42,
            {"tag": "p", "text": "Body"}
        ]));
        assert_eq!(html, "<h1>Title</h1>\n\n<p>Body</p>");
    }

    #[test]
    fn test_pre_with_line_break() {
        assert_eq!(
            render(json!([{"tag": "pre", "text": [{"tag": "br"}, "y"]}])),
            "<pre>\ny</pre>"
        );
    }

    #[test]
    fn test_pre_with_spans() {
        let html = render(json!([{"tag": "pre", "text": [
            {"tag": null, "text": "let x"},
            {"tag": "span", "content": [
                {"tag": null, "text": " = "},
                {"tag": "br", "text": ""},
                {"tag": "em", "text": "1 < 2"}
            ]},
            {"tag": "span", "content": "tail"},
            {"tag": "code", "text": "c"}
        ]}]));
        assert_eq!(
            html,
            "<pre>let x<span> = \n<em>1 &lt; 2</em></span><span>tail</span><code>c</code></pre>"
        );
    }

    #[test]
    fn test_pre_without_text_is_empty() {
        assert_eq!(render(json!([{"tag": "pre"}])), "<pre></pre>");
        assert_eq!(render(json!([{"tag": "pre", "text": null}])), "<pre></pre>");
    }

    #[test]
    fn test_pre_opaque_payload_is_pretty_json() {
        let html = render(json!([{"tag": "pre", "text": {"lines": 2}}]));
        assert_eq!(html, "<pre>{\n  &quot;lines&quot;: 2\n}</pre>");
    }

    #[test]
    fn test_blockquote_plain_text() {
        assert_eq!(
            render(json!([{"tag": "blockquote", "text": "hello"}])),
            "<blockquote>hello</blockquote>"
        );
        assert_eq!(
            render(json!([{"tag": "blockquote", "text": "a & b"}])),
            "<blockquote>a &amp; b</blockquote>"
        );
    }

    #[test]
    fn test_blockquote_mixed_children() {
        let html = render(json!([{"tag": "blockquote", "text": [
            "first",
            {"tag": "p", "text": [
                {"tag": null, "text": "see "},
                {"tag": "a", "text": "docs", "href": "https://a.example/?q=1&r=\"2\""}
            ]},
            {"tag": "br", "text": ""},
            {"tag": null, "text": "loose"},
            {"tag": "strong", "text": "<b>"}
        ]}]));
        assert_eq!(
            html,
            "<blockquote><p>first</p><p>see <a href=\"https://a.example/?q=1&amp;r=&quot;2&quot;\">docs</a></p><br>loose<strong>&lt;b&gt;</strong></blockquote>"
        );
    }

    #[test]
    fn test_unsafe_tags_are_neutralised() {
        assert_eq!(
            render(json!([{"tag": "script", "text": "alert(1)"}])),
            "<span>alert(1)</span>"
        );
        assert_eq!(
            render(json!([{"tag": "p onclick=x", "text": "t"}])),
            "<span>t</span>"
        );
    }

    #[test]
    fn test_bare_text_nodes() {
        assert_eq!(render(json!([{"tag": null, "text": "x&y"}])), "x&amp;y");
        assert_eq!(render(json!(["<raw>"])), "&lt;raw&gt;");
    }

    #[test]
    fn test_depth_bound() {
        let mut value = json!({"tag": "p", "text": "leaf"});
        for _ in 0..10 {
            value = json!({"tag": "div", "text": [value]});
        }
        let html = ContentRenderer::new()
            .with_max_depth(3)
            .render_value(&json!([value]));
        assert!(html.contains(TOO_DEEP));
        assert!(!html.contains("leaf"));
    }

    #[test]
    fn test_render_is_idempotent() {
        let value = json!([
            {"tag": "h2", "text": "T"},
            {"tag": "pre", "text": [{"tag": "span", "content": [{"tag": "br"}]}]},
            {"tag": "blockquote", "text": ["q"]}
        ]);
        let renderer = ContentRenderer::new();
        assert_eq!(renderer.render_value(&value), renderer.render_value(&value));
    }

    #[test]
    fn test_links() {
        let renderer = ContentRenderer::new();
        assert_eq!(renderer.render_links(&[]), "");
        let html = renderer.render_links(&[LinkItem {
            href: "https://a.example/\"x\"".into(),
            text: "A <site>".into(),
        }]);
        assert_eq!(
            html,
            "<ul class=\"links\"><li><a href=\"https://a.example/&quot;x&quot;\" target=\"_blank\" rel=\"noopener noreferrer\">A &lt;site&gt;</a></li></ul>"
        );
    }
}
