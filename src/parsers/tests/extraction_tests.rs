use crate::content::{Author, ContentNode, LinkItem};
use crate::parsers::{DocumentKind, Extractor, html};
use scraper::Html;
use url::Url;

const ARTICLE_PAGE: &str = r#"<html>
<head>
  <meta name="author" content="Jane Doe">
  <title>Understanding Ownership</title>
</head>
<body>
  <header><h1>Site name</h1><p>Tagline</p></header>
  <nav><ul><li><a href="/">Home</a></li><li><a href="/about">About</a></li></ul></nav>
  <div class="post-content">
    <h1>Understanding Ownership</h1>
    <p>Published 2024-02-10 by Jane.</p>
    <p>Rust uses <strong>ownership</strong> to manage memory.</p>
    <h2>Empty section</h2>
    <h2>Borrowing</h2>
    <p>References borrow values.</p>
    <ul><li><a href="/a">A</a></li><li><a href="/b">B</a></li></ul>
    <ul><li><p>Item with text</p></li></ul>
    <blockquote><p>Quoted <a href="/docs">the docs</a> text</p><strong>Emphasis</strong></blockquote>
    <pre>fn main() {<br><span class="kw">let</span> x = 1;
}</pre>
    <aside><p>Sidebar noise</p></aside>
  </div>
  <footer><p>Copyright</p></footer>
  <a href="https://other.example/deep-dive">A deep dive</a>
  <a href="/page/2">Next »</a>
</body>
</html>"#;

fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[cfg(test)]
mod html_tests {
    use super::*;

    #[test]
    fn test_article_content() {
        let extracted = Extractor::default()
            .extract(ARTICLE_PAGE, &url("https://example.com/posts/ownership"))
            .expect("page has main content");

        assert_eq!(
            extracted.page.content,
            vec![
                ContentNode::leaf("h1", "Understanding Ownership"),
                ContentNode::leaf("p", "Published 2024-02-10 by Jane."),
                ContentNode::leaf("p", "Rust uses ownership to manage memory."),
                ContentNode::leaf("h2", "Borrowing"),
                ContentNode::leaf("p", "References borrow values."),
                ContentNode::leaf("p", "Item with text"),
                ContentNode::parent(
                    "blockquote",
                    vec![
                        ContentNode::parent(
                            "p",
                            vec![
                                ContentNode::plain("Quoted"),
                                ContentNode::link("the docs", "https://example.com/docs"),
                                ContentNode::plain("text"),
                            ]
                        ),
                        ContentNode::leaf("strong", "Emphasis"),
                    ]
                ),
                ContentNode::parent(
                    "pre",
                    vec![
                        ContentNode::plain("fn main() {"),
                        ContentNode::line_break(),
                        ContentNode::span(vec![ContentNode::plain("let")]),
                        ContentNode::plain(" x = 1;\n}"),
                    ]
                ),
            ]
        );
    }

    #[test]
    fn test_article_metadata_and_kind() {
        let extracted = Extractor::default()
            .extract(ARTICLE_PAGE, &url("https://example.com/posts/ownership"))
            .unwrap();
        let page = extracted.page;

        assert_eq!(page.url, "https://example.com/posts/ownership");
        assert_eq!(page.kind, "Article");
        assert_eq!(
            page.metadata.author,
            Some(Author {
                name: Some("Jane Doe".into()),
                url: None
            })
        );
        assert_eq!(page.metadata.publication_date.as_deref(), Some("Feb 10, 2024"));
    }

    #[test]
    fn test_related_links_skip_chrome() {
        let extracted = Extractor::default()
            .extract(ARTICLE_PAGE, &url("https://example.com/posts/ownership"))
            .unwrap();

        let texts: Vec<&str> = extracted
            .all_links
            .iter()
            .map(|link| link.text.as_str())
            .collect();
        assert_eq!(texts, vec!["the docs", "A deep dive"]);
        assert!(extracted.all_links.contains(&LinkItem {
            href: "https://other.example/deep-dive".into(),
            text: "A deep dive".into()
        }));
        assert_eq!(
            extracted.next_page,
            Some(url("https://example.com/page/2"))
        );
    }

    #[test]
    fn test_link_lists_in_content_not_related() {
        let page = r#"<article>
            <p>Body</p>
            <ul><li><a href="/tag/rust">Rust tag</a></li><li><a href="/tag/web">Web tag</a></li></ul>
            <ol><li>Step with a <a href="/guide">setup guide</a></li><li>Plain step</li></ol>
        </article>
        <ul><li><a href="/elsewhere">Elsewhere story</a></li></ul>"#;

        let extracted = Extractor::default()
            .extract(page, &url("https://example.com/"))
            .unwrap();
        let texts: Vec<&str> = extracted
            .all_links
            .iter()
            .map(|link| link.text.as_str())
            .collect();
        assert_eq!(texts, vec!["setup guide", "Elsewhere story"]);
    }

    #[test]
    fn test_related_links_capped_per_page() {
        let anchors: String = (1..=15)
            .map(|i| format!(r#"<a href="/story-{i}">Story number {i}</a>"#))
            .collect();
        let page = format!(r#"<article><p>Body text</p></article>{anchors}"#);

        let extracted = Extractor::default()
            .extract(&page, &url("https://example.com/"))
            .unwrap();
        assert_eq!(extracted.all_links.len(), 15);
        assert_eq!(extracted.page.links.len(), 10);
        assert_eq!(extracted.page.links[0].text, "Story number 1");
    }

    #[test]
    fn test_no_main_content() {
        let page = "<html><body><p>Loose paragraph</p></body></html>";
        assert!(Extractor::default()
            .extract(page, &url("https://example.com/"))
            .is_none());
    }

    #[test]
    fn test_main_content_preference() {
        let doc = Html::parse_document(
            r#"<main><p>main</p></main><article><p>article</p></article><div class="entry-content"><p>div</p></div>"#,
        );
        let main = html::find_main_content(&doc).unwrap();
        assert_eq!(main.value().name(), "div");

        let doc = Html::parse_document(r#"<main><p>main</p></main><article><p>article</p></article>"#);
        assert_eq!(html::find_main_content(&doc).unwrap().value().name(), "article");

        let doc = Html::parse_document(r#"<nav><div class="content">menu</div></nav><main><p>m</p></main>"#);
        assert_eq!(html::find_main_content(&doc).unwrap().value().name(), "main");
    }

    #[test]
    fn test_bare_blockquote() {
        let page = r#"<article><blockquote>Only words here</blockquote><blockquote>  </blockquote></article>"#;
        let extracted = Extractor::default()
            .extract(page, &url("https://example.com/"))
            .unwrap();
        assert_eq!(
            extracted.page.content,
            vec![ContentNode::leaf("blockquote", "Only words here")]
        );
    }

    #[test]
    fn test_blockquote_repeated_text_dropped() {
        let page = r#"<article><blockquote>
            <p><strong>Same</strong> words</p>
            <strong>Same</strong>
        </blockquote></article>"#;
        let extracted = Extractor::default()
            .extract(page, &url("https://example.com/"))
            .unwrap();
        assert_eq!(
            extracted.page.content,
            vec![ContentNode::parent(
                "blockquote",
                vec![ContentNode::parent(
                    "p",
                    vec![
                        ContentNode::leaf("strong", "Same"),
                        ContentNode::plain("words"),
                    ]
                )]
            )]
        );
    }

    #[test]
    fn test_inline_links_filtered() {
        let page = r#"<article><blockquote><p>Please <a href="/subscribe">Subscribe</a> or read <a href="mailto:x@example.com">mail</a></p></blockquote></article>"#;
        let extracted = Extractor::default()
            .extract(page, &url("https://example.com/"))
            .unwrap();
        assert_eq!(
            extracted.page.content,
            vec![ContentNode::parent(
                "blockquote",
                vec![ContentNode::parent(
                    "p",
                    vec![ContentNode::plain("Please"), ContentNode::plain("or read")]
                )]
            )]
        );
    }
}

#[cfg(test)]
mod heading_tests {
    use super::*;

    #[test]
    fn test_heading_followed_by_heading_dropped() {
        let content = vec![
            ContentNode::leaf("h2", "A"),
            ContentNode::leaf("h3", "B"),
            ContentNode::leaf("p", "body"),
        ];
        assert_eq!(
            html::filter_empty_headings(content),
            vec![ContentNode::leaf("h3", "B"), ContentNode::leaf("p", "body")]
        );
    }

    #[test]
    fn test_trailing_heading_dropped() {
        let content = vec![ContentNode::leaf("p", "body"), ContentNode::leaf("h2", "End")];
        assert_eq!(
            html::filter_empty_headings(content),
            vec![ContentNode::leaf("p", "body")]
        );
    }

    #[test]
    fn test_non_headings_untouched() {
        let content = vec![ContentNode::leaf("p", "x"), ContentNode::leaf("strong", "y")];
        assert_eq!(html::filter_empty_headings(content.clone()), content);
        assert!(html::filter_empty_headings(Vec::new()).is_empty());
    }
}

#[cfg(test)]
mod document_kind_tests {
    use super::*;

    #[test]
    fn test_document_kind_from_url() {
        assert_eq!(DocumentKind::from_url(&url("https://x.example/a")), DocumentKind::Html);
        assert_eq!(
            DocumentKind::from_url(&url("https://x.example/README.md")),
            DocumentKind::Text
        );
        assert_eq!(
            DocumentKind::from_url(&url("https://x.example/notes.TXT")),
            DocumentKind::Text
        );
        assert_eq!(
            DocumentKind::from_url(&url("https://x.example/photo.jpg")),
            DocumentKind::Unsupported
        );
    }

    #[test]
    fn test_text_document() {
        let extracted = Extractor::default()
            .extract(
                "First paragraph\nstill first.\n\nSecond one.",
                &url("https://x.example/notes.txt"),
            )
            .unwrap();
        assert_eq!(
            extracted.page.content,
            vec![
                ContentNode::leaf("p", "First paragraph still first."),
                ContentNode::leaf("p", "Second one."),
            ]
        );
        assert!(extracted.page.links.is_empty());
        assert!(extracted.next_page.is_none());
    }

    #[test]
    fn test_unsupported_and_empty_documents() {
        let extractor = Extractor::default();
        assert!(extractor
            .extract("%PDF-1.4", &url("https://x.example/paper.pdf"))
            .is_none());
        assert!(extractor
            .extract("   \n\n ", &url("https://x.example/empty.txt"))
            .is_none());
    }
}
