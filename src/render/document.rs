use super::{ContentRenderer, escape_html};
use crate::content::{ContentNode, Metadata, ParsedDocument, SaveEntry, SaveId};

/// What happens to the document's first h1/h2 node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitlePolicy {
    /// Show it as the page title and leave it out of the body
    #[default]
    Extract,
    /// Leave it in the body; the header only carries the source link
    Inline,
}

/// The single action offered for a displayed document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentAction {
    Save,
    Remove(SaveId),
}

impl DocumentAction {
    /// A saved document (one with an id) can only be removed, any other only saved
    pub fn for_document(document: &ParsedDocument) -> Self {
        match document.id {
            Some(id) => DocumentAction::Remove(id),
            None => DocumentAction::Save,
        }
    }

    pub fn to_html(self) -> String {
        match self {
            DocumentAction::Save => {
                "<button type=\"button\" class=\"action\" data-action=\"save\">Save</button>"
                    .to_string()
            }
            DocumentAction::Remove(id) => format!(
                "<button type=\"button\" class=\"action\" data-action=\"remove\" data-id=\"{}\">Remove</button>",
                id
            ),
        }
    }
}

/// Renders whole documents and the saved-documents list
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentView {
    renderer: ContentRenderer,
    title_policy: TitlePolicy,
}

impl DocumentView {
    pub fn new(renderer: ContentRenderer, title_policy: TitlePolicy) -> Self {
        Self {
            renderer,
            title_policy,
        }
    }

    pub fn renderer(&self) -> &ContentRenderer {
        &self.renderer
    }

    pub fn render_document(&self, document: &ParsedDocument) -> String {
        let title = match self.title_policy {
            TitlePolicy::Extract => document
                .title_index()
                .and_then(|i| document.content[i].text().map(|text| (i, text))),
            TitlePolicy::Inline => None,
        };

        let body = match title {
            Some((index, _)) => {
                let mut rest: Vec<ContentNode> = document.content.clone();
                rest.remove(index);
                rest
            }
            None => document.content.clone(),
        };

        let mut html = String::from("<article class=\"document\">\n<header>\n");
        if let Some((_, text)) = title {
            html.push_str(&format!("<h1 class=\"title\">{}</h1>\n", escape_html(text)));
        }
        if let Some(meta) = render_metadata(&document.metadata, &document.kind) {
            html.push_str(&meta);
            html.push('\n');
        }
        html.push_str(&format!(
            "<p class=\"source\"><a href=\"{0}\">{0}</a></p>\n</header>\n",
            escape_html(&document.url)
        ));

        html.push_str("<section class=\"content\">\n");
        html.push_str(&self.renderer.render(&body));
        html.push_str("\n</section>\n");

        let links = self.renderer.render_links(&document.links);
        if !links.is_empty() {
            html.push_str("<section class=\"related\">\n<h2>Related links</h2>\n");
            html.push_str(&links);
            html.push_str("\n</section>\n");
        }

        html.push_str("<footer>");
        html.push_str(&DocumentAction::for_document(document).to_html());
        html.push_str("</footer>\n</article>");
        html
    }

    pub fn render_saves(&self, entries: &[SaveEntry]) -> String {
        if entries.is_empty() {
            return "<p class=\"notice\">No saved pages yet.</p>".to_string();
        }

        let items = entries
            .iter()
            .map(|entry| {
                let label = entry
                    .content
                    .iter()
                    .find(|node| node.is_title_heading())
                    .and_then(ContentNode::text)
                    .unwrap_or(entry.url.as_str());
                format!(
                    "<li data-id=\"{}\"><a href=\"{}\">{}</a></li>",
                    entry.id,
                    escape_html(&entry.url),
                    escape_html(label)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        format!("<ul class=\"saves\">\n{}\n</ul>", items)
    }
}

/// Author, publication date and type line; `None` when there is nothing to show
fn render_metadata(metadata: &Metadata, kind: &str) -> Option<String> {
    let mut parts = Vec::new();

    if let Some(author) = &metadata.author {
        let part = match (&author.name, &author.url) {
            (Some(name), Some(url)) => Some(format!(
                "<a class=\"author\" href=\"{}\">{}</a>",
                escape_html(url),
                escape_html(name)
            )),
            (Some(name), None) => Some(format!(
                "<span class=\"author\">{}</span>",
                escape_html(name)
            )),
            (None, Some(url)) => Some(format!(
                "<a class=\"author\" href=\"{0}\">{0}</a>",
                escape_html(url)
            )),
            (None, None) => None,
        };
        parts.extend(part);
    }
    if let Some(date) = &metadata.publication_date {
        parts.push(format!("<time>{}</time>", escape_html(date)));
    }
    if !kind.is_empty() {
        parts.push(format!("<span class=\"type\">{}</span>", escape_html(kind)));
    }

    if parts.is_empty() {
        None
    } else {
        Some(format!("<p class=\"meta\">{}</p>", parts.join(" · ")))
    }
}

/// Minimal standalone HTML page around a rendered fragment
pub fn render_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape_html(title),
        body
    )
}
