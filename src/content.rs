use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt;

/// Identifier the save store assigns to a persisted document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveId(pub u64);

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of extracted document structure.
///
/// Sequences of nodes coming off the wire may mix bare strings with tagged
/// elements, and may carry shapes nobody recognises. Deserialization never
/// fails: whatever cannot be read as an element is kept as `Unknown`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    /// A plain string child, as found inside `pre` and `blockquote`
    Bare(String),
    /// A `{tag, text, ...}` object
    Element(Element),
    /// Any other JSON value
    Unknown(Value),
}

/// A tagged content node
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Element {
    /// Element name, `None` for bare text
    pub tag: Option<String>,

    #[serde(skip_serializing_if = "NodeText::is_absent")]
    pub text: NodeText,

    /// Link target of anchor nodes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    /// Children of a `span` inside a `pre` block
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<NodeText>,

    /// Fields this crate does not interpret, kept for round-tripping
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of a node's `text` (or `content`) field
#[derive(Debug, Clone, PartialEq)]
pub enum NodeText {
    Leaf(String),
    Children(Vec<ContentNode>),
    /// `{ "text": "..." }`, unwrapped one level
    Wrapped(String),
    /// Anything else, including a missing field (`Null`)
    Opaque(Value),
}

impl Default for NodeText {
    fn default() -> Self {
        NodeText::Opaque(Value::Null)
    }
}

impl NodeText {
    pub fn is_absent(&self) -> bool {
        matches!(self, NodeText::Opaque(Value::Null))
    }

    /// The payload as flat text. Child sequences have no flat form and give "".
    pub fn leaf_text(&self) -> Cow<'_, str> {
        match self {
            NodeText::Leaf(text) | NodeText::Wrapped(text) => Cow::Borrowed(text.as_str()),
            NodeText::Opaque(value) => value_to_text(value),
            NodeText::Children(_) => Cow::Borrowed(""),
        }
    }
}

/// Stringify a JSON value the way it would read as text: null is empty,
/// strings are taken as-is, everything else uses its JSON form.
pub fn value_to_text(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed(""),
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

impl From<Value> for NodeText {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => NodeText::Leaf(s),
            Value::Array(items) => {
                NodeText::Children(items.into_iter().map(ContentNode::from).collect())
            }
            Value::Object(map) => match map.get("text") {
                Some(Value::String(inner)) => NodeText::Wrapped(inner.clone()),
                _ => NodeText::Opaque(Value::Object(map)),
            },
            other => NodeText::Opaque(other),
        }
    }
}

impl From<Value> for ContentNode {
    fn from(value: Value) -> Self {
        let mut map = match value {
            Value::String(s) => return ContentNode::Bare(s),
            Value::Object(map) => map,
            other => return ContentNode::Unknown(other),
        };

        let tag = match map.remove("tag") {
            None | Some(Value::Null) => None,
            Some(Value::String(tag)) => Some(tag),
            Some(other) => {
                map.insert("tag".to_string(), other);
                return ContentNode::Unknown(Value::Object(map));
            }
        };

        let text = map.remove("text").map(NodeText::from).unwrap_or_default();
        let content = map.remove("content").map(NodeText::from);
        let href = match map.remove("href") {
            Some(Value::String(href)) => Some(href),
            Some(other) => {
                map.insert("href".to_string(), other);
                None
            }
            None => None,
        };

        ContentNode::Element(Element {
            tag,
            text,
            href,
            content,
            extra: map,
        })
    }
}

impl Serialize for NodeText {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeText::Leaf(text) => serializer.serialize_str(text),
            NodeText::Children(children) => children.serialize(serializer),
            NodeText::Wrapped(text) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("text", text)?;
                map.end()
            }
            NodeText::Opaque(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for NodeText {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(NodeText::from)
    }
}

impl Serialize for ContentNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentNode::Bare(text) => serializer.serialize_str(text),
            ContentNode::Element(element) => element.serialize(serializer),
            ContentNode::Unknown(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ContentNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ContentNode::from)
    }
}

impl ContentNode {
    fn element(tag: Option<&str>, text: NodeText) -> Self {
        ContentNode::Element(Element {
            tag: tag.map(str::to_string),
            text,
            ..Element::default()
        })
    }

    /// `{tag, text: "..."}`
    pub fn leaf(tag: &str, text: impl Into<String>) -> Self {
        Self::element(Some(tag), NodeText::Leaf(text.into()))
    }

    /// `{tag: null, text: "..."}`
    pub fn plain(text: impl Into<String>) -> Self {
        Self::element(None, NodeText::Leaf(text.into()))
    }

    /// `{tag, text: [...]}`
    pub fn parent(tag: &str, children: Vec<ContentNode>) -> Self {
        Self::element(Some(tag), NodeText::Children(children))
    }

    /// `{tag: "a", text, href}`
    pub fn link(text: impl Into<String>, href: impl Into<String>) -> Self {
        ContentNode::Element(Element {
            tag: Some("a".to_string()),
            text: NodeText::Leaf(text.into()),
            href: Some(href.into()),
            ..Element::default()
        })
    }

    /// `{tag: "br", text: ""}`
    pub fn line_break() -> Self {
        Self::leaf("br", "")
    }

    /// `{tag: "span", content: [...]}`
    pub fn span(content: Vec<ContentNode>) -> Self {
        ContentNode::Element(Element {
            tag: Some("span".to_string()),
            content: Some(NodeText::Children(content)),
            ..Element::default()
        })
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            ContentNode::Element(element) => element.tag.as_deref(),
            _ => None,
        }
    }

    /// Flat text of a node, if it has one
    pub fn text(&self) -> Option<&str> {
        match self {
            ContentNode::Bare(text) => Some(text.as_str()),
            ContentNode::Element(Element {
                text: NodeText::Leaf(text) | NodeText::Wrapped(text),
                ..
            }) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Whether this node is a level-1 or level-2 heading
    pub fn is_title_heading(&self) -> bool {
        matches!(self.tag(), Some("h1") | Some("h2"))
    }
}

/// One entry in the related-links list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkItem {
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Author {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.url.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub publication_date: Option<String>,
}

/// Read a node list leniently: anything but an array reads as empty
fn lenient_nodes<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ContentNode>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().map(ContentNode::from).collect(),
        _ => Vec::new(),
    })
}

/// One crawled page, as produced by the extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    pub url: String,

    #[serde(default, deserialize_with = "lenient_nodes")]
    pub content: Vec<ContentNode>,

    #[serde(default)]
    pub metadata: Metadata,

    /// Content classification (News, Recipe, Article, ...)
    #[serde(rename = "type", alias = "content_type", default)]
    pub kind: String,

    #[serde(default)]
    pub links: Vec<LinkItem>,
}

/// Result of parsing a URL, possibly across several pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResponse {
    #[serde(default)]
    pub pages: Vec<PageResult>,
    #[serde(default)]
    pub links: Vec<LinkItem>,
}

impl ParseResponse {
    /// Fold the pages into one document: the first page gives the url,
    /// metadata and type, and the bodies are concatenated in page order.
    pub fn into_document(self) -> Option<ParsedDocument> {
        let mut pages = self.pages.into_iter();
        let first = pages.next()?;
        let mut content = first.content;
        for page in pages {
            content.extend(page.content);
        }
        let links = if self.links.is_empty() {
            first.links
        } else {
            self.links
        };

        Some(ParsedDocument {
            url: first.url,
            kind: first.kind,
            metadata: first.metadata,
            content,
            links,
            id: None,
        })
    }
}

/// A document ready for display. `id` is set once it has been saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub url: String,

    #[serde(rename = "type", alias = "content_type", default)]
    pub kind: String,

    #[serde(default)]
    pub metadata: Metadata,

    #[serde(default, deserialize_with = "lenient_nodes")]
    pub content: Vec<ContentNode>,

    #[serde(default)]
    pub links: Vec<LinkItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SaveId>,
}

impl ParsedDocument {
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Position of the first h1/h2 node
    pub fn title_index(&self) -> Option<usize> {
        self.content.iter().position(ContentNode::is_title_heading)
    }

    /// Text of the first h1/h2 node
    pub fn title(&self) -> Option<&str> {
        self.title_index().and_then(|i| self.content[i].text())
    }
}

/// A persisted document as the save store holds it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEntry {
    pub id: SaveId,

    #[serde(default)]
    pub url: String,

    #[serde(default, deserialize_with = "lenient_nodes")]
    pub content: Vec<ContentNode>,

    /// Remaining document fields (`type`, `metadata`, `links`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SaveEntry {
    pub fn from_document(id: SaveId, document: ParsedDocument) -> Self {
        let mut extra = Map::new();
        extra.insert("type".to_string(), Value::String(document.kind));
        if let Ok(metadata) = serde_json::to_value(&document.metadata) {
            extra.insert("metadata".to_string(), metadata);
        }
        if let Ok(links) = serde_json::to_value(&document.links) {
            extra.insert("links".to_string(), links);
        }

        Self {
            id,
            url: document.url,
            content: document.content,
            extra,
        }
    }

    /// Rebuild the displayable document; unreadable extra fields fall back to defaults
    pub fn to_document(&self) -> ParsedDocument {
        let field = |name: &str| self.extra.get(name).cloned().unwrap_or(Value::Null);
        ParsedDocument {
            url: self.url.clone(),
            kind: value_to_text(&field("type")).into_owned(),
            metadata: serde_json::from_value(field("metadata")).unwrap_or_default(),
            content: self.content.clone(),
            links: serde_json::from_value(field("links")).unwrap_or_default(),
            id: Some(self.id),
        }
    }
}

/// Reply to a save request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub id: SaveId,
    #[serde(default)]
    pub message: String,
}
