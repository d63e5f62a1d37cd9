use crate::content::ContentNode;
use crate::parsers::links::{LinkFilter, resolve};
use crate::parsers::text::{collapse_whitespace, join_fragments};
use scraper::{ElementRef, Html, Node};
use std::collections::HashSet;
use url::Url;

/// Page chrome that never holds the main content
const CHROME_TAGS: &[&str] = &["nav", "header", "footer", "aside", "script", "style", "noscript"];

/// Class fragments that mark a content container
const CONTENT_CLASSES: &[&str] = &["content", "main", "article", "post"];

/// Elements nested deeper than this are not visited
const MAX_HTML_DEPTH: usize = 256;

fn name<'a>(element: &ElementRef<'a>) -> &'a str {
    element.value().name()
}

fn is_chrome(element: &ElementRef) -> bool {
    CHROME_TAGS.contains(&name(element))
}

/// Whether the element sits inside navigation, header, footer or aside
pub fn in_chrome(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_chrome(&ancestor))
}

fn is_heading(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

/// Depth-first search for the first element matching `predicate`, skipping page chrome
fn find_first<'a>(
    element: ElementRef<'a>,
    predicate: &dyn Fn(&ElementRef<'a>) -> bool,
    depth: usize,
) -> Option<ElementRef<'a>> {
    if depth > MAX_HTML_DEPTH {
        return None;
    }

    for child in child_elements(element) {
        if is_chrome(&child) {
            continue;
        }
        if predicate(&child) {
            return Some(child);
        }
        if let Some(found) = find_first(child, predicate, depth + 1) {
            return Some(found);
        }
    }
    None
}

/// Locates the main content element of a page.
///
/// Preference order: a `div` with a content-like class, then `article`,
/// then `main`. Navigation, headers, footers and asides are never searched.
pub fn find_main_content(doc: &Html) -> Option<ElementRef<'_>> {
    let root = doc.root_element();

    let content_div = |element: &ElementRef| {
        name(element) == "div"
            && element
                .value()
                .classes()
                .any(|class| CONTENT_CLASSES.iter().any(|c| class.contains(c)))
    };

    find_first(root, &content_div, 0)
        .or_else(|| find_first(root, &|element| name(element) == "article", 0))
        .or_else(|| find_first(root, &|element| name(element) == "main", 0))
}

/// A list made only of links (menus, tag clouds, share bars)
fn is_link_list(list: &ElementRef) -> bool {
    list.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|element| name(element) == "li")
        .all(|item| {
            item.descendants()
                .filter_map(ElementRef::wrap)
                .any(|element| name(&element) == "a")
        })
}

/// Whether the element sits in a link-only list inside `main`
pub fn in_link_list(element: &ElementRef, main: &ElementRef) -> bool {
    let mut listed = false;
    for ancestor in element.ancestors().filter_map(ElementRef::wrap) {
        if ancestor.id() == main.id() {
            return listed;
        }
        if matches!(name(&ancestor), "ul" | "ol") && is_link_list(&ancestor) {
            listed = true;
        }
    }
    false
}

/// Extracts content blocks from the main content element
pub struct ContentExtractor<'f> {
    base: &'f Url,
    inline_links: &'f LinkFilter,
}

impl<'f> ContentExtractor<'f> {
    pub fn new(base: &'f Url, inline_links: &'f LinkFilter) -> Self {
        Self { base, inline_links }
    }

    /// Collect paragraphs, headings, quotes, code blocks and strong text in
    /// document order, then drop headings that introduce nothing.
    pub fn extract(&self, main: ElementRef) -> Vec<ContentNode> {
        let mut blocks = Vec::new();
        self.collect(main, &mut blocks, 0);
        filter_empty_headings(blocks)
    }

    fn collect(&self, element: ElementRef, blocks: &mut Vec<ContentNode>, depth: usize) {
        if depth > MAX_HTML_DEPTH {
            ::log::warn!("HTML nested deeper than {} levels, skipping the rest", MAX_HTML_DEPTH);
            return;
        }

        for child in child_elements(element) {
            let tag = name(&child);
            if is_chrome(&child) {
                continue;
            }

            match tag {
                "ul" | "ol" if is_link_list(&child) => {
                    ::log::trace!("Skipping link list");
                }
                "p" | "strong" => {
                    let text = join_fragments(child.text());
                    if !text.is_empty() {
                        blocks.push(ContentNode::leaf(tag, text));
                    }
                }
                tag if is_heading(tag) => {
                    let text = join_fragments(child.text());
                    if !text.is_empty() {
                        blocks.push(ContentNode::leaf(tag, text));
                    }
                }
                "blockquote" => blocks.extend(self.blockquote(child)),
                "pre" => blocks.push(pre(child)),
                _ => self.collect(child, blocks, depth + 1),
            }
        }
    }

    /// `{tag: blockquote, text: [...]}` from the quote's paragraphs and strong
    /// children, with repeated texts dropped. A quote made of bare text becomes
    /// `{tag: blockquote, text: "..."}`; an empty one yields nothing.
    fn blockquote(&self, quote: ElementRef) -> Option<ContentNode> {
        let mut seen = HashSet::new();
        let mut parts = Vec::new();

        for child in child_elements(quote) {
            match name(&child) {
                "p" => {
                    let paragraph = self.paragraph_parts(child, &mut seen);
                    if !paragraph.is_empty() {
                        parts.push(ContentNode::parent("p", paragraph));
                    }
                }
                "strong" => {
                    let text = join_fragments(child.text());
                    if !text.is_empty() && seen.insert(text.clone()) {
                        parts.push(ContentNode::leaf("strong", text));
                    }
                }
                _ => {}
            }
        }

        if !parts.is_empty() {
            return Some(ContentNode::parent("blockquote", parts));
        }

        let text = join_fragments(quote.text());
        (!text.is_empty()).then(|| ContentNode::leaf("blockquote", text))
    }

    /// Text runs, accepted anchors and strong runs of a quoted paragraph
    fn paragraph_parts(&self, paragraph: ElementRef, seen: &mut HashSet<String>) -> Vec<ContentNode> {
        let mut parts = Vec::new();

        for child in paragraph.children() {
            match child.value() {
                Node::Text(text) => {
                    let text = text.trim();
                    if !text.is_empty() && seen.insert(text.to_string()) {
                        parts.push(ContentNode::plain(text));
                    }
                }
                Node::Element(element) => {
                    let Some(element_ref) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let text = join_fragments(element_ref.text());
                    if text.is_empty() || seen.contains(&text) {
                        continue;
                    }
                    match element.name() {
                        "a" => {
                            let href = element
                                .attr("href")
                                .and_then(|href| resolve(self.base, href));
                            if let Some(href) = href.filter(|href| self.inline_links.accepts(&text, href)) {
                                seen.insert(text.clone());
                                parts.push(ContentNode::link(text, href.to_string()));
                            }
                        }
                        "strong" => {
                            seen.insert(text.clone());
                            parts.push(ContentNode::leaf("strong", text));
                        }
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        parts
    }
}

/// `{tag: pre, text: [...]}` keeping the raw text of the block
pub fn pre(block: ElementRef) -> ContentNode {
    let children = block
        .children()
        .filter_map(|child| match child.value() {
            Node::Text(text) => Some(ContentNode::plain(text.trim_end_matches('\n'))),
            Node::Element(_) => {
                let element = ElementRef::wrap(child)?;
                Some(match name(&element) {
                    "span" => ContentNode::span(
                        element
                            .children()
                            .filter_map(|inner| match inner.value() {
                                Node::Text(text) => {
                                    Some(ContentNode::plain(text.trim_end_matches('\n')))
                                }
                                Node::Element(_) => ElementRef::wrap(inner).map(pre_leaf),
                                _ => None,
                            })
                            .collect(),
                    ),
                    _ => pre_leaf(element),
                })
            }
            _ => None,
        })
        .collect();

    ContentNode::parent("pre", children)
}

fn pre_leaf(element: ElementRef) -> ContentNode {
    match name(&element) {
        "br" => ContentNode::line_break(),
        tag => ContentNode::leaf(
            tag,
            element.text().collect::<String>().trim_end_matches('\n'),
        ),
    }
}

/// Drops a heading when the next block is also a heading, or when it is last
pub fn filter_empty_headings(content: Vec<ContentNode>) -> Vec<ContentNode> {
    let is_heading_node = |node: &ContentNode| node.tag().is_some_and(is_heading);
    let keep: Vec<bool> = (0..content.len())
        .map(|i| {
            !is_heading_node(&content[i])
                || content.get(i + 1).is_some_and(|next| !is_heading_node(next))
        })
        .collect();

    content
        .into_iter()
        .zip(keep)
        .filter_map(|(node, keep)| keep.then_some(node))
        .collect()
}

/// Page text outside the chrome, used for date detection
pub fn page_text(doc: &Html) -> String {
    let fragments: Vec<&str> = doc
        .root_element()
        .descendants()
        .filter(|node| {
            !node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| is_chrome(&ancestor))
        })
        .filter_map(|node| match node.value() {
            Node::Text(text) => Some(&**text),
            _ => None,
        })
        .collect();
    collapse_whitespace(&fragments.join(" "))
}
